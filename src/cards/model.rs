use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// A stored credit card record.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: i32,
    pub number: String,
    pub expiration_date: String,
    pub cvv: i32,
    pub holder: String,
}

/// Body of `POST /cards` and `PUT /cards/{id}`.
///
/// Missing and `null` fields decode to their zero value so the validator
/// reports them as blank instead of failing the decode. `cvv` is read as a
/// 64-bit integer so out-of-range values reach the validator too. A client
/// supplied `id` is ignored.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CardRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub expiration_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cvv: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub holder: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl CardRequest {
    /// `cvv` narrowed to the stored width; `None` when it does not fit, which
    /// a validated request never hits.
    #[must_use]
    pub fn stored_cvv(&self) -> Option<i32> {
        i32::try_from(self.cvv).ok()
    }

    /// Attach a storage identifier, producing the record to persist.
    /// Expects a validated request.
    #[must_use]
    pub fn into_card(self, id: i32) -> Card {
        Card {
            id,
            cvv: self.stored_cvv().unwrap_or_default(),
            number: self.number,
            expiration_date: self.expiration_date,
            holder: self.holder,
        }
    }
}
