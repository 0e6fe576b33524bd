//! Markup fixtures for the end-to-end tests
#![allow(dead_code)]

/// Identifier of listing `index` on page `page`
pub fn listing_id(page: u32, index: usize) -> String {
    format!("B{page:03}{index:06}")
}

/// amazon.com style listing with every field present
pub fn english_listing(id: &str, price: &str) -> String {
    format!(
        r#"<div data-asin="{id}" data-component-type="s-search-result" class="s-result-item">
  <img class="s-image" src="https://m.media-amazon.com/images/I/{id}.jpg">
  <h2><span>Acme</span></h2>
  <h2><a href="/dp/{id}"><span>Over-Ear Headphones {id}</span></a></h2>
  <span aria-label="4.3 out of 5 stars"><span class="a-icon-alt">4.3 out of 5 stars</span></span>
  <a href="/dp/{id}#customerReviews"><span>(2,048)</span></a>
  <span class="a-price"><span class="a-offscreen">{price}</span></span>
</div>"#
    )
}

/// amazon.it style listing with every field present
pub fn italian_listing(id: &str, price: &str) -> String {
    format!(
        r#"<div data-asin="{id}" data-component-type="s-search-result" class="s-result-item">
  <img class="s-image" src="https://m.media-amazon.com/images/I/{id}.jpg">
  <h2><span>Cuffie Bluetooth {id}</span></h2>
  <span aria-label="4,7 su 5 stelle"><span class="a-icon-alt">4,7 su 5 stelle</span></span>
  <a href="/dp/{id}#customerReviews"><span>(12.345)</span></a>
  <span class="a-price"><span class="a-offscreen">{price}</span></span>
</div>"#
    )
}

/// Results document with a pagination strip ending at `total_pages`
pub fn results_page(listings: &[String], total_pages: u32) -> String {
    let mut pagination = String::from(
        r#"<span class="s-pagination-strip"><span class="s-pagination-item s-pagination-selected">1</span>"#,
    );
    if total_pages > 1 {
        pagination.push_str(&format!(
            r#"<span class="s-pagination-item s-pagination-ellipsis">...</span><span class="s-pagination-item s-pagination-disabled">{total_pages}</span><a class="s-pagination-item s-pagination-next">Next</a>"#
        ));
    }
    pagination.push_str("</span>");

    format!(
        "<!doctype html><html><body><div class=\"s-main-slot\">{}</div>{pagination}</body></html>",
        listings.concat()
    )
}

/// English page `page` with `count` listings priced $10.00, $11.00, ...
pub fn english_page(page: u32, count: usize, total_pages: u32) -> String {
    let listings: Vec<String> = (0..count)
        .map(|i| english_listing(&listing_id(page, i), &format!("${}.00", 10 + i)))
        .collect();
    results_page(&listings, total_pages)
}
