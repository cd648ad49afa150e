use std::future::Future;

/// Requests pages `1, 2, ...` until one comes back shorter than `per_page`.
pub async fn fetch_all<T, F, Fut>(per_page: u32, mut list_page: F) -> anyhow::Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<T>>>,
{
    if per_page == 0 {
        anyhow::bail!("per_page must be greater than zero");
    }

    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let page_items = list_page(page).await?;
        let is_last = page_items.len() < per_page as usize;
        items.extend(page_items);
        if is_last {
            return Ok(items);
        }
        page += 1;
    }
}
