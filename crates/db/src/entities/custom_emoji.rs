//! Custom emoji entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "custom_emojis")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Name without surrounding colons
    pub shortcode: String,

    /// NULL for local emoji
    #[sea_orm(nullable)]
    pub domain: Option<String>,

    /// `ActivityPub` ID of the `Emoji` object (remote emoji)
    #[sea_orm(nullable)]
    pub uri: Option<String>,

    pub image_url: String,

    #[sea_orm(nullable)]
    pub static_image_url: Option<String>,

    #[sea_orm(default_value = false)]
    pub disabled: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.domain.is_none()
    }

    /// Static image, falling back to the animated one.
    #[must_use]
    pub fn static_url(&self) -> &str {
        self.static_image_url.as_deref().unwrap_or(&self.image_url)
    }
}
