use reqwest::Url;

use super::escape;
use crate::errors::UpdateFailure;
use crate::models::{OrderStatus, ShippingProvider};
use crate::services::order_board::{page_bounds, BoardView, OrderRow};
use strum::IntoEnumIterator;

const COLUMNS: [&str; 11] = [
    "Order ID",
    "Customer Name",
    "Address",
    "Phone",
    "Items",
    "Total Price",
    "Placed At",
    "Status",
    "Shipping Provider",
    "Tracking Number",
    "Actions",
];

const STYLE: &str = "body{font-family:sans-serif;margin:20px}\
table{border-collapse:collapse;width:100%;border:2px solid rgb(10,124,238)}\
th,td{padding:6px 10px;border-bottom:1px solid #ddd;text-align:left;vertical-align:top}\
.error{color:red}.alert{background:#fdecea;color:#611a15;padding:8px;margin-bottom:10px}\
.pager{display:flex;gap:12px;justify-content:flex-end;padding:8px}";

/// Any absolute base works; only the resulting path is used.
const ACTION_BASE: &str = "http://order-board.local/";

/// Form action for `/orders/<id>/<action>` with the id encoded as one path segment.
fn order_action(id: &str, action: &str) -> String {
    let mut url = match Url::parse(ACTION_BASE) {
        Ok(url) => url,
        Err(_) => return format!("/orders/{}/{action}", escape(id)),
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().extend(["orders", id, action]);
    }
    escape(url.path())
}

/// Full HTML document for one page of the board.
pub fn render_board_page(view: &BoardView, alert: Option<UpdateFailure>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Orders</title>");
    html.push_str(&format!("<style>{STYLE}</style></head><body>"));
    html.push_str(
        "<form method=\"post\" action=\"/reload\"><button type=\"submit\">Reload</button></form>",
    );

    if let Some(alert) = alert {
        let message = alert.alert_message();
        html.push_str(&format!(
            "<div class=\"alert\" role=\"alert\">{}</div>",
            escape(message)
        ));
        let literal = serde_json::to_string(message).unwrap_or_default();
        html.push_str(&format!("<script>window.alert({literal});</script>"));
    }

    html.push_str("<table><thead><tr>");
    for column in COLUMNS {
        html.push_str(&format!("<th>{column}</th>"));
    }
    html.push_str("</tr></thead><tbody>");

    match &view.error {
        Some(error) => html.push_str(&format!(
            "<tr><td class=\"error\" colspan=\"{}\">{}</td></tr>",
            COLUMNS.len(),
            escape(error)
        )),
        None => {
            for row in &view.rows {
                html.push_str(&render_row(row, view.page));
            }
        }
    }

    html.push_str("</tbody></table>");
    html.push_str(&render_pager(view));
    html.push_str("</body></html>");
    html
}

fn render_row(row: &OrderRow, page: usize) -> String {
    let id = escape(&row.id);
    let save_form = format!("save-{id}");
    let disabled = if row.editing { "" } else { " disabled" };

    let items: String = row
        .items
        .iter()
        .map(|item| format!("<div>{}</div>", escape(item)))
        .collect();

    let mut cells = vec![
        id.clone(),
        escape(&row.customer_name),
        escape(&row.address),
        escape(&row.phone),
        items,
        escape(&row.total),
        escape(&row.placed_at),
        render_status_select(row, page),
    ];

    cells.push(format!(
        "<select name=\"shipping_provider\" form=\"{save_form}\"{disabled}>{}</select>",
        provider_options(row.shipping_provider)
    ));
    cells.push(format!(
        "<input type=\"text\" name=\"tracking_number\" form=\"{save_form}\" value=\"{}\"{disabled}>",
        escape(&row.tracking_number)
    ));

    let action = if row.editing {
        format!(
            "<form id=\"{save_form}\" method=\"post\" action=\"{}\">\
             <input type=\"hidden\" name=\"page\" value=\"{page}\">\
             <button type=\"submit\">Save</button></form>",
            order_action(&row.id, "save")
        )
    } else {
        format!(
            "<form method=\"post\" action=\"{}\">\
             <input type=\"hidden\" name=\"page\" value=\"{page}\">\
             <button type=\"submit\">Edit</button></form>",
            order_action(&row.id, "edit")
        )
    };
    cells.push(action);

    let cells: String = cells
        .into_iter()
        .map(|cell| format!("<td>{cell}</td>"))
        .collect();
    format!("<tr data-order-id=\"{id}\">{cells}</tr>")
}

fn render_status_select(row: &OrderRow, page: usize) -> String {
    let mut options = String::new();
    if !OrderStatus::selectable().any(|status| status == row.status) {
        // Current value is shown but cannot be chosen again.
        options.push_str(&format!(
            "<option value=\"{0}\" selected disabled>{0}</option>",
            escape(row.status.as_wire())
        ));
    }
    for status in OrderStatus::selectable() {
        let selected = if status == row.status { " selected" } else { "" };
        options.push_str(&format!(
            "<option value=\"{0}\"{selected}>{0}</option>",
            escape(status.as_wire())
        ));
    }

    format!(
        "<form method=\"post\" action=\"{}\">\
         <input type=\"hidden\" name=\"page\" value=\"{page}\">\
         <select name=\"status\" onchange=\"this.form.submit()\">{options}</select></form>",
        order_action(&row.id, "status")
    )
}

fn provider_options(current: Option<ShippingProvider>) -> String {
    let mut options = format!(
        "<option value=\"\"{}></option>",
        if current.is_none() { " selected" } else { "" }
    );
    for provider in ShippingProvider::iter() {
        let selected = if Some(provider) == current {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!("<option value=\"{provider}\"{selected}>{provider}</option>"));
    }
    options
}

fn render_pager(view: &BoardView) -> String {
    let bounds = page_bounds(view.page, view.total);
    let range = if bounds.is_empty() {
        format!("0–0 of {}", view.total)
    } else {
        format!("{}–{} of {}", bounds.start + 1, bounds.end, view.total)
    };

    let prev = if view.page > 0 {
        format!("<a href=\"/?page={}\">Previous</a>", view.page - 1)
    } else {
        "<span>Previous</span>".to_string()
    };
    let next = if view.page + 1 < view.page_count {
        format!("<a href=\"/?page={}\">Next</a>", view.page + 1)
    } else {
        "<span>Next</span>".to_string()
    };

    format!(
        "<div class=\"pager\"><span>Rows per page: {}</span><span>{range}</span>{prev}{next}</div>",
        view.page_size
    )
}
