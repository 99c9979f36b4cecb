//! Recommended imports grouped by abstraction level.
//!
//! `dx` covers application code working with aggregations.
//! `advanced` exposes the collaborator seams for custom backends.

pub mod dx {
    //! Everyday surface: sessions, aggregation roots and their ordered lists.
    pub use crate::{
        AggregationConfig, AggregationError, GraphSession, ListSource, OrderedList,
        PendingTarget, Result, Subject, TargetRef,
    };
}

pub mod advanced {
    //! Collaborator traits and low-level graph types for custom stores,
    //! resolvers and savers.
    pub use crate::{
        Changeset, EntityResolver, EntitySaver, GraphChange, HeadSource, LoadedEntity,
        OrderedReader, ProxyLoader, ProxyNode, SaveRequest, StatementStore, Statement,
        TriplePattern, TypeRegistry,
    };
}
