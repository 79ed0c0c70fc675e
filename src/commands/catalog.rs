use async_trait::async_trait;
use tracing::debug;

use crate::bot::AppContext;
use crate::fetch::catalog::Product;
use crate::fetch::FetchError;
use crate::handler::FetchHandler;
use crate::reply::{Button, Keyboard, Photo, Reply};
use crate::router::Call;

pub fn caption(product: &Product) -> String {
    format!(
        "*** product: {} ***\nprice: {}\ndescription: {}\nrating: {}, count: {}",
        product.title,
        product.price,
        product.description,
        product.rating.rate,
        product.rating.count
    )
}

/// `/fakestore`: one button per category, one per row.
pub struct CategoryMenu;

#[async_trait]
impl FetchHandler for CategoryMenu {
    type Data = Vec<String>;

    async fn fetch(&self, ctx: &AppContext, _call: &Call) -> Result<Vec<String>, FetchError> {
        let categories = ctx.catalog.categories().await?;
        if categories.is_empty() {
            return Err(FetchError::Missing("categories"));
        }
        ctx.categories.replace(categories.iter().cloned());
        debug!("Catalog offers {} categories", categories.len());
        Ok(categories)
    }

    fn format(
        &self,
        _ctx: &AppContext,
        _call: &Call,
        categories: Vec<String>,
    ) -> Result<Reply, FetchError> {
        let rows = categories
            .into_iter()
            .map(|c| vec![Button::send(c)])
            .collect();
        Ok(Reply::keyboard("select a category:", Keyboard::reply(rows)))
    }
}

/// A category button press: one photo per product.
pub struct CategoryProducts;

#[async_trait]
impl FetchHandler for CategoryProducts {
    type Data = Vec<Product>;

    async fn fetch(&self, ctx: &AppContext, call: &Call) -> Result<Vec<Product>, FetchError> {
        let category = call.text().ok_or(FetchError::Missing("category"))?;
        ctx.catalog.products_in(category).await
    }

    fn format(
        &self,
        _ctx: &AppContext,
        _call: &Call,
        products: Vec<Product>,
    ) -> Result<Reply, FetchError> {
        let mut photos: Vec<Photo> = products
            .iter()
            .map(|p| Photo {
                url: p.image.clone(),
                caption: Some(caption(p)),
            })
            .collect();
        match photos.len() {
            0 => Err(FetchError::Missing("products")),
            1 => Ok(Reply::photo(photos.remove(0))),
            _ => Ok(Reply::photos(photos)),
        }
    }
}
