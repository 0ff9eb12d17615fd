use crate::peer::Relation;

/// Gao-Rexford export filter.
///
/// Routes learned from a customer are exported to everyone; routes learned
/// from a peer or a provider are exported only to customers. The same
/// predicate gates data-plane forwarding: traffic transits us only when we
/// are paid on at least one side.
pub fn should_export(from: Relation, to: Relation) -> bool {
    from == Relation::Customer || to == Relation::Customer
}
