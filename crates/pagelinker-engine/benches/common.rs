// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_order_page(rows: usize) -> String {
    let mut html = String::from("<html><body><h1>Orders</h1><table>");
    for row in 0..rows {
        let invoice = 61000 + (row % 14000);
        html.push_str(&format!(
            "<tr><td>Invoice #{invoice}</td><td>Ship 1Z999AA1{:010}</td>\
             <td><a href=\"/orders/{row}\">{row}</a></td><td>Note: call 555-{row:04}</td></tr>",
            10_000_000 + row
        ));
    }
    html.push_str("</table></body></html>");
    html
}

#[allow(dead_code)]
pub fn generate_plain_page(paragraphs: usize) -> String {
    "<p>Nothing to link in this paragraph, only words and the odd 42.</p>".repeat(paragraphs)
}
