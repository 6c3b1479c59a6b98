use sea_orm::entity::prelude::*;

/// Booking mirrored from the reservation platform, keyed by its external code.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub customer_id: Option<i64>,
    pub service: String,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub duration_minutes: i32,
    /// `active` | `cancelled` | `completed`
    pub status: String,
    pub rating: Option<i16>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::ChannelId"
    )]
    Customers,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
