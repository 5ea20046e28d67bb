pub mod order_board;

pub use order_board::{BoardView, OrderBoard, OrderRow, PAGE_SIZE};
