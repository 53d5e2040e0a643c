use slotmap::new_key_type;

new_key_type! {
    /// Stable handle of a registered collision object.
    pub struct ObjectHandle;
    /// Stable handle of a contact manifold owned by the contact solver.
    pub struct ManifoldHandle;
}
