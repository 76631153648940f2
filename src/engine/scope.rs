use anyhow::Result;

use crate::model::{Entry, EntryKind, Mode, Session, Share, listing_order};
use crate::store::Store;

/// One addressable element of the current scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Entry(Entry),
    Share(Share),
}

impl Item {
    pub fn into_entry(self) -> Option<Entry> {
        match self {
            Item::Entry(e) => Some(e),
            Item::Share(_) => None,
        }
    }

    pub fn into_share(self) -> Option<Share> {
        match self {
            Item::Share(s) => Some(s),
            Item::Entry(_) => None,
        }
    }
}

/// Ordered list of items an `element_idx` addresses for this (subject, mode).
pub fn scope(store: &dyn Store, subject: &Entry, session: &Session) -> Result<Vec<Item>> {
    let items: Vec<Item> = match session.mode {
        Mode::Sharing => shares(store, subject)?
            .into_iter()
            .map(Item::Share)
            .collect(),
        Mode::Searching => search_results(store, session)?
            .into_iter()
            .map(Item::Entry)
            .collect(),
        Mode::Gearing => labels(store, subject)?
            .into_iter()
            .map(Item::Entry)
            .collect(),
        Mode::Browsing => listing(store, subject)?
            .into_iter()
            .map(Item::Entry)
            .collect(),
    };
    Ok(items)
}

pub fn by_index(
    store: &dyn Store,
    subject: &Entry,
    session: &Session,
    idx: usize,
) -> Result<Option<Item>> {
    Ok(scope(store, subject, session)?.into_iter().nth(idx))
}

pub fn listing(store: &dyn Store, subject: &Entry) -> Result<Vec<Entry>> {
    let mut children = store.list(&subject.id)?;
    children.sort_by(listing_order);
    Ok(children)
}

pub fn search_results(store: &dyn Store, session: &Session) -> Result<Vec<Entry>> {
    let root = session.search_dir_id.as_ref().unwrap_or(&session.root_id);
    let mut found = store.search(&session.query, root)?;
    found.sort_by(listing_order);
    Ok(found)
}

pub fn labels(store: &dyn Store, subject: &Entry) -> Result<Vec<Entry>> {
    let mut labels = store.list_of_kind(&subject.id, EntryKind::Label)?;
    labels.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(labels)
}

pub fn shares(store: &dyn Store, subject: &Entry) -> Result<Vec<Share>> {
    let mut shares = store.list_for_entry(&subject.id)?;
    shares.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(shares)
}

#[cfg(test)]
#[path = "../tests/engine/scope_tests.rs"]
mod tests;
