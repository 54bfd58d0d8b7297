use std::collections::BTreeMap;

use physbox_macro_tools::Deref;

use crate::element::ID;

use super::contact::ContactConstraint;

/// active contact constraints of the current tick keyed by (smaller id, larger id)
#[derive(Deref, Default)]
pub struct ContactConstraintManifold {
    #[deref]
    map: BTreeMap<(ID, ID), ContactConstraint>,
}
