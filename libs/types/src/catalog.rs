//! Built-in promotion catalog
//!
//! The shared enum and message types used by promotion logging:
//!
//! ```text
//! InsertionLogFlatPromotion
//! └── flat_promotion: FlatPromotion
//!     ├── entity_path: EntityPath   (uint64 ids 1..=6)
//!     ├── platform / customer / campaign   { status }
//!     ├── account    { status, currency_code }
//!     └── promotion  { status, content { status, external_content_id }, bid_type, bid_amount }
//! ```
//!
//! [`schema()`] returns one lazily built `Arc<Schema>` for the whole process,
//! so messages created from it can be embedded in each other freely.

use std::sync::Arc;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use once_cell::sync::Lazy;

use crate::message::Value;
use crate::schema::{EnumDef, FieldDef, KindDef, MessageDef, Schema, SchemaDef};

/// Message type names
pub mod names {
    pub const ENTITY_PATH: &str = "EntityPath";
    pub const PLATFORM: &str = "Platform";
    pub const CUSTOMER: &str = "Customer";
    pub const ACCOUNT: &str = "Account";
    pub const CAMPAIGN: &str = "Campaign";
    pub const CONTENT: &str = "Content";
    pub const PROMOTION: &str = "Promotion";
    pub const FLAT_PROMOTION: &str = "FlatPromotion";
    pub const INSERTION_LOG_FLAT_PROMOTION: &str = "InsertionLogFlatPromotion";

    pub const CURRENCY_CODE: &str = "CurrencyCode";
    pub const STATUS: &str = "Status";
    pub const BID_TYPE: &str = "BidType";
}

/// Field numbers per message type
pub mod fields {
    pub mod entity_path {
        pub const PLATFORM_ID: u32 = 1;
        pub const CUSTOMER_ID: u32 = 2;
        pub const CONTENT_ID: u32 = 3;
        pub const ACCOUNT_ID: u32 = 4;
        pub const CAMPAIGN_ID: u32 = 5;
        pub const PROMOTION_ID: u32 = 6;
    }

    /// Shared by `Platform`, `Customer` and `Campaign`
    pub mod status_only {
        pub const STATUS: u32 = 1;
    }

    pub mod account {
        pub const STATUS: u32 = 1;
        pub const CURRENCY_CODE: u32 = 2;
    }

    pub mod content {
        pub const STATUS: u32 = 1;
        pub const EXTERNAL_CONTENT_ID: u32 = 2;
    }

    pub mod promotion {
        pub const STATUS: u32 = 1;
        pub const CONTENT: u32 = 2;
        pub const BID_TYPE: u32 = 3;
        pub const BID_AMOUNT: u32 = 4;
    }

    pub mod flat_promotion {
        pub const ENTITY_PATH: u32 = 1;
        pub const PLATFORM: u32 = 2;
        pub const CUSTOMER: u32 = 3;
        pub const ACCOUNT: u32 = 4;
        pub const CAMPAIGN: u32 = 5;
        pub const PROMOTION: u32 = 6;
    }

    pub mod insertion_log_flat_promotion {
        pub const FLAT_PROMOTION: u32 = 1;
    }
}

/// ISO 4217 currency codes accepted on `Account`
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum CurrencyCode {
    UnknownCurrencyCode = 0,
    Usd = 1,
    Eur = 2,
    Jpy = 3,
    Gbp = 4,
    Aud = 5,
    Cad = 6,
    Chf = 7,
    Cny = 8,
    Hkd = 9,
    Nzd = 10,
    Sek = 11,
    Krw = 12,
    Sgd = 13,
    Nok = 14,
    Mxn = 15,
    Inr = 16,
    Rub = 17,
    Zar = 18,
    Try = 19,
    Brl = 20,
}

impl CurrencyCode {
    pub const ALL: [CurrencyCode; 21] = [
        CurrencyCode::UnknownCurrencyCode,
        CurrencyCode::Usd,
        CurrencyCode::Eur,
        CurrencyCode::Jpy,
        CurrencyCode::Gbp,
        CurrencyCode::Aud,
        CurrencyCode::Cad,
        CurrencyCode::Chf,
        CurrencyCode::Cny,
        CurrencyCode::Hkd,
        CurrencyCode::Nzd,
        CurrencyCode::Sek,
        CurrencyCode::Krw,
        CurrencyCode::Sgd,
        CurrencyCode::Nok,
        CurrencyCode::Mxn,
        CurrencyCode::Inr,
        CurrencyCode::Rub,
        CurrencyCode::Zar,
        CurrencyCode::Try,
        CurrencyCode::Brl,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CurrencyCode::UnknownCurrencyCode => "UNKNOWN_CURRENCY_CODE",
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Aud => "AUD",
            CurrencyCode::Cad => "CAD",
            CurrencyCode::Chf => "CHF",
            CurrencyCode::Cny => "CNY",
            CurrencyCode::Hkd => "HKD",
            CurrencyCode::Nzd => "NZD",
            CurrencyCode::Sek => "SEK",
            CurrencyCode::Krw => "KRW",
            CurrencyCode::Sgd => "SGD",
            CurrencyCode::Nok => "NOK",
            CurrencyCode::Mxn => "MXN",
            CurrencyCode::Inr => "INR",
            CurrencyCode::Rub => "RUB",
            CurrencyCode::Zar => "ZAR",
            CurrencyCode::Try => "TRY",
            CurrencyCode::Brl => "BRL",
        }
    }
}

/// Lifecycle state shared by every promotion entity
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum Status {
    UnknownStatus = 0,
    Active = 1,
    Paused = 2,
    Archived = 3,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::UnknownStatus, Status::Active, Status::Paused, Status::Archived];

    pub fn name(&self) -> &'static str {
        match self {
            Status::UnknownStatus => "UNKNOWN_STATUS",
            Status::Active => "ACTIVE",
            Status::Paused => "PAUSED",
            Status::Archived => "ARCHIVED",
        }
    }
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum BidType {
    UnknownBidType = 0,
    /// Cost per mille
    Cpm = 1,
    /// Cost per click
    Cpc = 2,
}

impl BidType {
    pub const ALL: [BidType; 3] = [BidType::UnknownBidType, BidType::Cpm, BidType::Cpc];

    pub fn name(&self) -> &'static str {
        match self {
            BidType::UnknownBidType => "UNKNOWN_BID_TYPE",
            BidType::Cpm => "CPM",
            BidType::Cpc => "CPC",
        }
    }
}

macro_rules! enum_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Enum(v.into())
                }
            }
        )*
    };
}

enum_value_from!(CurrencyCode, Status, BidType);

/// Declarative form of the catalog, for extension or serialization
pub fn definition() -> SchemaDef {
    use fields::*;

    let currency = CurrencyCode::ALL
        .iter()
        .fold(EnumDef::new(names::CURRENCY_CODE), |e, c| e.value(c.name(), (*c).into()));
    let status = Status::ALL
        .iter()
        .fold(EnumDef::new(names::STATUS), |e, s| e.value(s.name(), (*s).into()));
    let bid_type = BidType::ALL
        .iter()
        .fold(EnumDef::new(names::BID_TYPE), |e, b| e.value(b.name(), (*b).into()));

    let status_only = |name: &str| {
        MessageDef::new(name).field(FieldDef::enumeration(status_only::STATUS, "status", names::STATUS))
    };

    SchemaDef::new()
        .enumeration(currency)
        .enumeration(status)
        .enumeration(bid_type)
        .message(
            MessageDef::new(names::ENTITY_PATH)
                .field(FieldDef::new(entity_path::PLATFORM_ID, "platform_id", KindDef::Uint64))
                .field(FieldDef::new(entity_path::CUSTOMER_ID, "customer_id", KindDef::Uint64))
                .field(FieldDef::new(entity_path::CONTENT_ID, "content_id", KindDef::Uint64))
                .field(FieldDef::new(entity_path::ACCOUNT_ID, "account_id", KindDef::Uint64))
                .field(FieldDef::new(entity_path::CAMPAIGN_ID, "campaign_id", KindDef::Uint64))
                .field(FieldDef::new(entity_path::PROMOTION_ID, "promotion_id", KindDef::Uint64)),
        )
        .message(status_only(names::PLATFORM))
        .message(status_only(names::CUSTOMER))
        .message(
            MessageDef::new(names::ACCOUNT)
                .field(FieldDef::enumeration(account::STATUS, "status", names::STATUS))
                .field(FieldDef::enumeration(account::CURRENCY_CODE, "currency_code", names::CURRENCY_CODE)),
        )
        .message(status_only(names::CAMPAIGN))
        .message(
            MessageDef::new(names::CONTENT)
                .field(FieldDef::enumeration(content::STATUS, "status", names::STATUS))
                .field(FieldDef::new(content::EXTERNAL_CONTENT_ID, "external_content_id", KindDef::String)),
        )
        .message(
            MessageDef::new(names::PROMOTION)
                .field(FieldDef::enumeration(promotion::STATUS, "status", names::STATUS))
                .field(FieldDef::message(promotion::CONTENT, "content", names::CONTENT))
                .field(FieldDef::enumeration(promotion::BID_TYPE, "bid_type", names::BID_TYPE))
                .field(FieldDef::new(promotion::BID_AMOUNT, "bid_amount", KindDef::Double)),
        )
        .message(
            MessageDef::new(names::FLAT_PROMOTION)
                .field(FieldDef::message(flat_promotion::ENTITY_PATH, "entity_path", names::ENTITY_PATH))
                .field(FieldDef::message(flat_promotion::PLATFORM, "platform", names::PLATFORM))
                .field(FieldDef::message(flat_promotion::CUSTOMER, "customer", names::CUSTOMER))
                .field(FieldDef::message(flat_promotion::ACCOUNT, "account", names::ACCOUNT))
                .field(FieldDef::message(flat_promotion::CAMPAIGN, "campaign", names::CAMPAIGN))
                .field(FieldDef::message(flat_promotion::PROMOTION, "promotion", names::PROMOTION)),
        )
        .message(MessageDef::new(names::INSERTION_LOG_FLAT_PROMOTION).field(FieldDef::message(
            insertion_log_flat_promotion::FLAT_PROMOTION,
            "flat_promotion",
            names::FLAT_PROMOTION,
        )))
}

static CATALOG: Lazy<Arc<Schema>> = Lazy::new(|| {
    // Static definition; covered by test_catalog_builds
    definition().build().expect("built-in catalog must be a valid schema")
});

/// Process-wide catalog schema
pub fn schema() -> Arc<Schema> {
    Arc::clone(&CATALOG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::EnumSymbol;
    use crate::schema::FieldKind;

    #[test]
    fn test_catalog_builds() {
        assert!(definition().build().is_ok());
        let schema = schema();
        assert_eq!(schema.messages().len(), 9);
        assert_eq!(schema.enums().len(), 3);
    }

    #[test]
    fn test_catalog_is_shared() {
        assert!(Arc::ptr_eq(&schema(), &schema()));
    }

    #[test]
    fn test_enum_numbering_matches_descriptors() {
        let schema = schema();
        let currency = schema.enum_by_name(names::CURRENCY_CODE).unwrap();
        for code in CurrencyCode::ALL {
            assert_eq!(currency.to_symbol(code.into()), EnumSymbol::Known(code.name()));
        }
        assert_eq!(currency.value_of("BRL"), Some(20));
        assert!(!currency.is_valid(21));

        assert_eq!(schema.enum_symbol(names::STATUS, 3), EnumSymbol::Known("ARCHIVED"));
        assert_eq!(schema.enum_symbol(names::BID_TYPE, 2), EnumSymbol::Known("CPC"));
    }

    #[test]
    fn test_typed_enum_conversion() {
        let schema = schema();
        let mut account = schema.new_message(names::ACCOUNT).unwrap();
        account.set(fields::account::CURRENCY_CODE, CurrencyCode::Jpy).unwrap();
        account.set(fields::account::STATUS, Status::Paused).unwrap();

        let currency = account.get_enum(fields::account::CURRENCY_CODE).unwrap();
        assert_eq!(currency.typed::<CurrencyCode>(), Some(CurrencyCode::Jpy));
        assert_eq!(
            account.get_enum(fields::account::STATUS).unwrap().typed::<Status>(),
            Some(Status::Paused)
        );

        account.set_enum_raw(fields::account::CURRENCY_CODE, 99).unwrap();
        assert_eq!(account.get_enum(fields::account::CURRENCY_CODE).unwrap().typed::<CurrencyCode>(), None);
    }

    #[test]
    fn test_flat_promotion_shape() {
        let schema = schema();
        let flat = schema.message_by_name(names::FLAT_PROMOTION).unwrap();
        let numbers: Vec<u32> = flat.fields().iter().map(|f| f.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert!(flat.fields().iter().all(|f| matches!(f.kind, FieldKind::Message(_))));

        let promotion = schema.message_by_name(names::PROMOTION).unwrap();
        assert_eq!(promotion.field(fields::promotion::BID_AMOUNT).unwrap().kind, FieldKind::Double);
    }

    #[test]
    fn test_status_is_field_one_everywhere() {
        let schema = schema();
        let status = schema.enum_id(names::STATUS).unwrap();
        for name in [
            names::PLATFORM,
            names::CUSTOMER,
            names::ACCOUNT,
            names::CAMPAIGN,
            names::CONTENT,
            names::PROMOTION,
        ] {
            let field = schema.message_by_name(name).unwrap().field_by_name("status").unwrap();
            assert_eq!(field.number, 1, "{name}");
            assert_eq!(field.kind, FieldKind::Enum(status), "{name}");
        }

        // absent status reads as the zero member
        let content = schema.new_message(names::CONTENT).unwrap();
        assert!(!content.has(fields::content::STATUS));
        assert_eq!(content.get_enum(fields::content::STATUS).unwrap().raw, 0);
    }

    #[test]
    fn test_nested_build() {
        let schema = schema();
        let mut log = schema.new_message(names::INSERTION_LOG_FLAT_PROMOTION).unwrap();
        let flat = log.message_mut(fields::insertion_log_flat_promotion::FLAT_PROMOTION).unwrap();
        flat.message_mut(fields::flat_promotion::ENTITY_PATH)
            .unwrap()
            .set(fields::entity_path::PROMOTION_ID, 42u64)
            .unwrap();
        flat.message_mut(fields::flat_promotion::PROMOTION)
            .unwrap()
            .message_mut(fields::promotion::CONTENT)
            .unwrap()
            .set(fields::content::EXTERNAL_CONTENT_ID, "ABC123")
            .unwrap();

        assert_eq!(
            log.to_string(),
            "InsertionLogFlatPromotion { flat_promotion: FlatPromotion { entity_path: EntityPath { promotion_id: 42 }, \
             promotion: Promotion { content: Content { external_content_id: \"ABC123\" } } } }"
        );
    }
}
