use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardMarkup, InputFile, InputMedia, InputMediaPhoto, MessageId, ParseMode,
};
use unic_langid::LanguageIdentifier;
use url::Url;

use crate::catalog::Product;
use crate::core::config::{self, ProductImageView};
use crate::core::money::format_price;
use crate::core::AppResult;
use crate::i18n;
use crate::telegram::handlers::types::HandlerDeps;
use crate::telegram::{cb, escape_html, Bot};

/// Navigation row for the image carousel: Next on the first image, Previous
/// on the last, both in between.
fn carousel_keyboard(lang: &LanguageIdentifier, product: &Product, index: usize) -> InlineKeyboardMarkup {
    let last = product.image_urls.len().saturating_sub(1);
    let prev = cb(
        i18n::t(lang, "product-carousel-prev"),
        format!("carousel:{}:{}", product.id, index.saturating_sub(1)),
    );
    let next = cb(
        i18n::t(lang, "product-carousel-next"),
        format!("carousel:{}:{}", product.id, index + 1),
    );

    let row = if index == 0 {
        vec![next]
    } else if index >= last {
        vec![prev]
    } else {
        vec![prev, next]
    };
    InlineKeyboardMarkup::new(vec![row])
}

/// Product detail text in Telegram HTML: bold name, description, price with
/// the original struck through when discounted.
fn product_text(lang: &LanguageIdentifier, product: &Product, currency: &str) -> String {
    let mut text = format!("<b>{}</b>\n\n", escape_html(&product.name));
    if let Some(description) = &product.description {
        text.push_str(&escape_html(description));
        text.push_str("\n\n");
    }

    let price_label = i18n::t(lang, "product-price");
    match product.discount_percent() {
        Some(percent) => {
            text.push_str(&format!(
                "{}: <s>{}</s> {} ({}% off)",
                price_label,
                format_price(product.price_cents, currency),
                format_price(product.sale_price_cents(), currency),
                percent
            ));
        }
        None => {
            text.push_str(&format!(
                "{}: {}",
                price_label,
                format_price(product.price_cents, currency)
            ));
        }
    }
    text
}

fn image_files(product: &Product) -> Vec<InputFile> {
    product
        .image_urls
        .iter()
        .filter_map(|raw| match Url::parse(raw) {
            Ok(url) => Some(InputFile::url(url)),
            Err(e) => {
                log::warn!("Skipping bad image URL for product {}: {}", product.id, e);
                None
            }
        })
        .collect()
}

/// Shows the product detail: images first (gallery or carousel per config),
/// then the description message with the purchase keyboard.
pub async fn show_product(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    product_id: i64,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);

    let Some(product) = deps.store.product_by_id(product_id).await? else {
        let text = i18n::t_with(&lang, "product-not-found", &[("id", &product_id.to_string())]);
        bot.send_message(chat_id, text).await?;
        return Ok(());
    };

    let images = image_files(&product);
    match images.len() {
        0 => {}
        1 => {
            let mut it = images.into_iter();
            if let Some(file) = it.next() {
                bot.send_photo(chat_id, file).await?;
            }
        }
        _ => match *config::PRODUCT_IMAGE_VIEW {
            ProductImageView::Gallery => {
                let media: Vec<InputMedia> = images
                    .into_iter()
                    .map(|file| InputMedia::Photo(InputMediaPhoto::new(file)))
                    .collect();
                bot.send_media_group(chat_id, media).await?;
            }
            ProductImageView::Carousel => {
                let mut it = images.into_iter();
                if let Some(first) = it.next() {
                    bot.send_photo(chat_id, first)
                        .reply_markup(carousel_keyboard(&lang, &product, 0))
                        .await?;
                }
            }
        },
    }

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![cb(
            i18n::t(&lang, "product-add-to-cart"),
            format!("cart:add:{product_id}"),
        )],
        vec![cb(i18n::t(&lang, "cart-button"), "cart")],
        vec![cb(i18n::t(&lang, "back-categories"), "categories")],
    ]);

    bot.send_message(chat_id, product_text(&lang, &product, deps.store.currency()))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// Swaps the carousel photo in place. The requested index is clamped into
/// the valid range.
pub async fn change_carousel_image(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    user_id: i64,
    product_id: i64,
    index: usize,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let lang = i18n::user_lang_from_pool(&deps.db_pool, user_id);

    let Some(product) = deps.store.product_by_id(product_id).await? else {
        let text = i18n::t_with(&lang, "product-not-found", &[("id", &product_id.to_string())]);
        bot.send_message(chat_id, text).await?;
        return Ok(());
    };
    if product.image_urls.is_empty() {
        return Ok(());
    }

    let index = index.min(product.image_urls.len() - 1);
    let url = Url::parse(&product.image_urls[index])
        .map_err(|e| crate::core::AppError::Catalog(format!("bad image URL: {e}")))?;

    bot.edit_message_media(
        chat_id,
        message_id,
        InputMedia::Photo(InputMediaPhoto::new(InputFile::url(url))),
    )
    .reply_markup(carousel_keyboard(&lang, &product, index))
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with_images(n: usize) -> Product {
        Product {
            id: 5,
            name: "Lamp".to_string(),
            category_id: 1,
            price_cents: 1000,
            description: Some("A lamp.".to_string()),
            discount: None,
            variants: vec![],
            image_urls: (0..n).map(|i| format!("https://placehold.co/15{i}")).collect(),
            stock: None,
            is_digital: false,
        }
    }

    fn row_labels(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
        keyboard.inline_keyboard.iter().flatten().map(|b| b.text.clone()).collect()
    }

    #[test]
    fn first_image_only_offers_next() {
        let lang = i18n::lang_from_code("en");
        let product = product_with_images(3);
        let labels = row_labels(&carousel_keyboard(&lang, &product, 0));

        assert_eq!(labels.len(), 1);
        assert!(labels[0].contains("Next"));
    }

    #[test]
    fn last_image_only_offers_previous() {
        let lang = i18n::lang_from_code("en");
        let product = product_with_images(3);
        let labels = row_labels(&carousel_keyboard(&lang, &product, 2));

        assert_eq!(labels.len(), 1);
        assert!(labels[0].contains("Previous"));
    }

    #[test]
    fn middle_image_offers_both_directions() {
        let lang = i18n::lang_from_code("en");
        let product = product_with_images(3);
        let labels = row_labels(&carousel_keyboard(&lang, &product, 1));

        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn discounted_product_shows_both_prices() {
        let lang = i18n::lang_from_code("en");
        let mut product = product_with_images(0);
        product.discount = Some(0.25);

        let text = product_text(&lang, &product, "USD");
        assert!(text.contains("<s>$10.00</s>"));
        assert!(text.contains("$7.50"));
        assert!(text.contains("(25% off)"));
    }

    #[test]
    fn product_text_escapes_html() {
        let lang = i18n::lang_from_code("en");
        let mut product = product_with_images(0);
        product.name = "Cables <& more>".to_string();

        let text = product_text(&lang, &product, "USD");
        assert!(text.contains("Cables &lt;&amp; more&gt;"));
    }
}
