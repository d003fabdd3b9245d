//! Profile lookup: an ordered list of collections scanned for a profile by
//! uid, stopping at the first hit.
//!
//! Profiles are written to both the general `users` collection and a
//! role-specific one, and older accounts may exist in only one of them. The
//! default order checks `users` first, then `employers`, then `employees`.
//! Callers must not rely on which collection served a result.

use gigboard_core::{
  document::{Collection, FieldFilter},
  profile::{Profile, UID_FIELD},
  store::DocumentStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{LookupOrderError, ProfileLoadError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<Collection>")]
pub struct ProfileLookup {
  order: Vec<Collection>,
}

impl Default for ProfileLookup {
  fn default() -> Self {
    Self {
      order: vec![Collection::Users, Collection::Employers, Collection::Employees],
    }
  }
}

impl TryFrom<Vec<Collection>> for ProfileLookup {
  type Error = LookupOrderError;

  fn try_from(order: Vec<Collection>) -> Result<Self, Self::Error> {
    Self::new(order)
  }
}

impl ProfileLookup {
  pub fn new(order: Vec<Collection>) -> Result<Self, LookupOrderError> {
    if order.is_empty() {
      return Err(LookupOrderError::Empty);
    }
    if let Some(other) = order.iter().copied().find(|c| {
      !matches!(c, Collection::Users | Collection::Employers | Collection::Employees)
    }) {
      return Err(LookupOrderError::NotAProfileCollection(other));
    }
    Ok(Self { order })
  }

  pub fn order(&self) -> &[Collection] { &self.order }

  /// Scan the collections in order and return the first profile whose `uid`
  /// matches. `Ok(None)` means every collection was read and none held one.
  pub async fn resolve<D: DocumentStore>(
    &self,
    store: &D,
    uid: Uuid,
  ) -> Result<Option<Profile>, ProfileLoadError> {
    let filters = [FieldFilter::eq(UID_FIELD, uid.to_string())];

    for &collection in &self.order {
      let docs = store
        .query(collection, &filters)
        .await
        .map_err(|e| ProfileLoadError::Store { collection, source: Box::new(e) })?;

      if let Some(doc) = docs.first() {
        let stored = doc
          .decode::<Profile>()
          .map_err(|source| ProfileLoadError::Decode { collection, source })?;
        tracing::debug!(%uid, %collection, "profile found");
        return Ok(Some(stored.record));
      }
    }

    tracing::debug!(%uid, "no profile in any collection");
    Ok(None)
  }
}
