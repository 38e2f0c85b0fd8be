// access-gate-schema/src/query.rs
// ============================================================================
// Module: Query Generation
// Description: Declarative field-selection queries built from attributes.
// Purpose: Fold attribute metadata into graph-query selections and key rewrites.
// Dependencies: crate::{descriptor, key}, serde, serde_json
// ============================================================================

//! ## Overview
//! A query is an ordered tree of field selectors and joins. Two entry points
//! build them: [`attributes_to_query`] folds a sequence of descriptors into a
//! selection (expanding `ref` attributes with a known target into a nested
//! selection of the target's identity key), and
//! [`rewrite_query_attributes_to_keys`] lowers a query authored with
//! attribute handles — the ergonomic form that gives callers IDE navigation —
//! into the qualified-key form the wire layer understands. Both preserve
//! input order, nesting, and attached directives.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::descriptor::AttributeDescriptor;
use crate::descriptor::AttributeKind;
use crate::key::QualifiedKey;

// ============================================================================
// SECTION: Query Model
// ============================================================================

/// Directive map attached to a query node.
pub type Directives = BTreeMap<String, Value>;

/// One node of a key-form query.
///
/// # Invariants
/// - Variants are stable for serialization.
/// - Child order inside a join is meaningful and preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum QueryNode {
    /// Bare field selector.
    Field {
        /// Selected attribute key.
        key: QualifiedKey,
        /// Directives attached to the selector.
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        directives: Directives,
    },
    /// Nested selection through a reference attribute.
    Join {
        /// Joined attribute key.
        key: QualifiedKey,
        /// Child selection, in order.
        children: Vec<QueryNode>,
        /// Directives attached to the join.
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        directives: Directives,
    },
}

/// Ordered field-selection query in qualified-key form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    /// Top-level selection, in order.
    pub nodes: Vec<QueryNode>,
}

// ============================================================================
// SECTION: Attribute-Handle Query Model
// ============================================================================

/// One node of a query authored with attribute handles.
#[derive(Debug, Clone)]
pub enum AttrNode {
    /// Bare field selector holding its descriptor.
    Field {
        /// Selected attribute.
        attr: Arc<AttributeDescriptor>,
        /// Directives attached to the selector.
        directives: Directives,
    },
    /// Nested selection holding its descriptor and children.
    Join {
        /// Joined attribute.
        attr: Arc<AttributeDescriptor>,
        /// Child selection, in order.
        children: Vec<AttrNode>,
        /// Directives attached to the join.
        directives: Directives,
    },
}

impl AttrNode {
    /// Builds a bare field node without directives.
    #[must_use]
    pub fn field(attr: Arc<AttributeDescriptor>) -> Self {
        Self::Field {
            attr,
            directives: Directives::new(),
        }
    }

    /// Builds a join node without directives.
    #[must_use]
    pub fn join(attr: Arc<AttributeDescriptor>, children: Vec<Self>) -> Self {
        Self::Join {
            attr,
            children,
            directives: Directives::new(),
        }
    }
}

/// Ordered query authored with attribute handles.
#[derive(Debug, Clone, Default)]
pub struct AttrQuery {
    /// Top-level selection, in order.
    pub nodes: Vec<AttrNode>,
}

// ============================================================================
// SECTION: Query Builders
// ============================================================================

/// Folds an ordered sequence of descriptors into a field-selection query.
///
/// A `ref` attribute with a known target expands into a join selecting
/// exactly the target's identity key; a `ref` without a target degrades to a
/// bare selector, and every other kind passes through as a bare selector.
/// Input order is preserved.
#[must_use]
pub fn attributes_to_query(attrs: &[Arc<AttributeDescriptor>]) -> Query {
    let nodes = attrs
        .iter()
        .map(|attr| match (attr.kind(), attr.target()) {
            (AttributeKind::Ref, Some(target)) => QueryNode::Join {
                key: attr.key().clone(),
                children: vec![QueryNode::Field {
                    key: target.clone(),
                    directives: Directives::new(),
                }],
                directives: Directives::new(),
            },
            _ => QueryNode::Field {
                key: attr.key().clone(),
                directives: Directives::new(),
            },
        })
        .collect();
    Query { nodes }
}

/// Lowers an attribute-handle query into qualified-key form.
///
/// The walk is structural: nesting depth, join structure, child order, and
/// attached directives are preserved; every attribute handle is replaced by
/// its qualified key.
#[must_use]
pub fn rewrite_query_attributes_to_keys(query: &AttrQuery) -> Query {
    Query {
        nodes: query.nodes.iter().map(rewrite_node).collect(),
    }
}

/// Rewrites one attribute-handle node into key form.
fn rewrite_node(node: &AttrNode) -> QueryNode {
    match node {
        AttrNode::Field { attr, directives } => QueryNode::Field {
            key: attr.key().clone(),
            directives: directives.clone(),
        },
        AttrNode::Join {
            attr,
            children,
            directives,
        } => QueryNode::Join {
            key: attr.key().clone(),
            children: children.iter().map(rewrite_node).collect(),
            directives: directives.clone(),
        },
    }
}
