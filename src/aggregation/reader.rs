use super::proxy::{ProxyLoader, ProxyNode};
use crate::core::{AggregationError, Result, Subject};
use futures::Stream;
use tracing::{Level, event};

/// Anything that exposes the head of a proxy chain.
pub trait HeadSource {
    fn head_subject(&self) -> Option<&Subject>;
}

impl HeadSource for Option<Subject> {
    fn head_subject(&self) -> Option<&Subject> {
        self.as_ref()
    }
}

impl HeadSource for Subject {
    fn head_subject(&self) -> Option<&Subject> {
        Some(self)
    }
}

enum ReaderState {
    Start(Option<Subject>),
    After(ProxyNode),
    Done,
}

/// Lazy forward walk over a proxy chain starting at `head`.
///
/// Each step resolves one node. When the node about to be yielded does not
/// point back at its predecessor, the reader corrects its `prev` link in the
/// loader's cache before yielding it. Only links actually visited are
/// repaired. A cyclic chain is walked forever.
pub struct OrderedReader<'a> {
    loader: &'a mut ProxyLoader,
    state: ReaderState,
}

impl<'a> OrderedReader<'a> {
    pub fn new<H>(root: &H, loader: &'a mut ProxyLoader) -> Self
    where
        H: HeadSource + ?Sized,
    {
        Self {
            loader,
            state: ReaderState::Start(root.head_subject().cloned()),
        }
    }

    /// Resolves the node after `current`. Never mutates anything.
    pub async fn read_next(
        loader: &mut ProxyLoader,
        current: &ProxyNode,
    ) -> Result<Option<ProxyNode>> {
        current.next(loader).await
    }

    /// Points `next.prev` at `current` if it does not already. Returns whether
    /// a repair was made.
    pub fn repair_if_needed(
        loader: &mut ProxyLoader,
        current: &ProxyNode,
        next: &mut ProxyNode,
    ) -> bool {
        if next.prev_id() == Some(current.subject()) {
            return false;
        }
        event!(
            Level::DEBUG,
            node = %next.subject(),
            stale_prev = ?next.prev_id(),
            prev = %current.subject(),
            "repairing proxy back-link"
        );
        next.set_prev(Some(current.subject().clone()));
        loader.record_prev(next);
        true
    }

    /// Next node in the chain, or `None` past the tail. After an error the
    /// reader is exhausted.
    pub async fn next(&mut self) -> Result<Option<ProxyNode>> {
        let state = std::mem::replace(&mut self.state, ReaderState::Done);
        let node = match state {
            ReaderState::Start(Some(head)) => Some(self.loader.load(&head).await?),
            ReaderState::Start(None) | ReaderState::Done => None,
            ReaderState::After(current) => {
                match Self::read_next(&mut *self.loader, &current).await? {
                    Some(mut next) => {
                        Self::repair_if_needed(&mut *self.loader, &current, &mut next);
                        Some(next)
                    }
                    None => None,
                }
            }
        };
        if let Some(node) = &node {
            self.state = ReaderState::After(node.clone());
        }
        Ok(node)
    }

    /// Walks the remainder of the chain.
    pub async fn collect_all(mut self) -> Result<Vec<ProxyNode>> {
        let mut nodes = Vec::new();
        while let Some(node) = self.next().await? {
            nodes.push(node);
        }
        Ok(nodes)
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<ProxyNode>> + 'a {
        futures::stream::try_unfold(self, |mut reader| async move {
            let node = reader.next().await?;
            Ok::<_, AggregationError>(node.map(|node| (node, reader)))
        })
    }
}
