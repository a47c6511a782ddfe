//! Subtree traversal iterators.
//!
//! Both walks keep a cursor OID and advance it to the last name the agent
//! returned, so no OID is requested twice. Termination is driven by the
//! agent: an empty response, an `endOfMibView` exception, or the first
//! name outside the root subtree ends the walk. Errors are yielded as
//! iterator items; after an error the iterator is fused.

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::transport::Transport;
use crate::value::Value;
use crate::varbind::VarBind;

use super::Client;

/// GETNEXT-based walk over the subtree rooted at a base OID.
///
/// Created by [`Client::walk`]. Each `next()` performs one GETNEXT
/// exchange.
#[derive(Debug)]
pub struct Walk<'a, T: Transport> {
    client: &'a mut Client<T>,
    root: Oid,
    cursor: Oid,
    done: bool,
}

impl<'a, T: Transport> Walk<'a, T> {
    pub(super) fn new(client: &'a mut Client<T>, root: Oid) -> Self {
        let cursor = root.clone();
        Self {
            client,
            root,
            cursor,
            done: false,
        }
    }
}

impl<T: Transport> Iterator for Walk<'_, T> {
    type Item = Result<VarBind>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.client.get_next(&self.cursor) {
            Ok(vb) => {
                // A v2c agent past the last OID echoes the request name
                // with an endOfMibView value; the echoed name is still
                // inside the subtree, so check the value first.
                if matches!(vb.value, Value::EndOfMibView) {
                    tracing::debug!(target: "sync_snmp::client", root = %self.root, "endOfMibView");
                    self.done = true;
                    return None;
                }
                if !vb.oid.starts_with(&self.root) {
                    tracing::debug!(
                        target: "sync_snmp::client",
                        oid = %vb.oid,
                        root = %self.root,
                        "left subtree, stopping walk"
                    );
                    self.done = true;
                    return None;
                }
                self.cursor = vb.oid.clone();
                Some(Ok(vb))
            }
            // An empty response means the view is exhausted.
            Err(Error::NoResponses) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// GETBULK-based walk over the subtree rooted at a base OID.
///
/// Created by [`Client::bulk_walk`]. Fetches `max_repetitions` bindings per
/// exchange and drains them lazily. A new batch is requested only when the
/// final binding of the previous one was still inside the subtree;
/// `endOfMibView` or an out-of-subtree tail ends the walk.
#[derive(Debug)]
pub struct BulkWalk<'a, T: Transport> {
    client: &'a mut Client<T>,
    root: Oid,
    cursor: Oid,
    max_repetitions: u8,
    buffer: std::vec::IntoIter<VarBind>,
    done: bool,
}

impl<'a, T: Transport> BulkWalk<'a, T> {
    pub(super) fn new(client: &'a mut Client<T>, root: Oid, max_repetitions: u8) -> Self {
        let cursor = root.clone();
        Self {
            client,
            root,
            cursor,
            max_repetitions,
            buffer: Vec::new().into_iter(),
            done: false,
        }
    }

    /// Fetch and filter one batch, returning an error item if the exchange
    /// failed.
    fn fetch_batch(&mut self) -> Option<Result<()>> {
        let batch = match self.client.get_bulk(
            0,
            self.max_repetitions,
            std::slice::from_ref(&self.cursor),
        ) {
            Ok(batch) => batch,
            Err(Error::NoResponses) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        let total = batch.len();
        let mut keep = Vec::with_capacity(total);
        let mut continue_from = None;
        for (index, vb) in batch.into_iter().enumerate() {
            if matches!(vb.value, Value::EndOfMibView) {
                tracing::debug!(target: "sync_snmp::client", root = %self.root, "endOfMibView");
                break;
            }
            if !vb.oid.starts_with(&self.root) {
                break;
            }
            if index == total - 1 {
                continue_from = Some(vb.oid.clone());
            }
            keep.push(vb);
        }
        match continue_from {
            Some(next) => self.cursor = next,
            None => self.done = true,
        }
        self.buffer = keep.into_iter();
        Some(Ok(()))
    }
}

impl<T: Transport> Iterator for BulkWalk<'_, T> {
    type Item = Result<VarBind>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(vb) = self.buffer.next() {
                return Some(Ok(vb));
            }
            if self.done {
                return None;
            }
            match self.fetch_batch() {
                Some(Ok(())) => continue,
                Some(Err(e)) => return Some(Err(e)),
                None => return None,
            }
        }
    }
}
