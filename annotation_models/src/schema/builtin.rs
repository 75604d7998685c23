//! Stock annotation schemas
//!
//! Point groups shared by most annotation types, the registered annotation
//! types, and the `contact` schema used alongside the root entity tables.

use indexmap::IndexMap;

use super::types::{Field, FieldKind, Schema};

/// PostGIS subtype of annotation points
pub const POINT_GEOMETRY: &str = "POINTZ";

/// Annotation type name of the pairwise contact schema
pub const CONTACT: &str = "contact";

/// A bare 3-D point
pub fn spatial_point() -> IndexMap<String, Field> {
    let mut fields = IndexMap::new();
    fields.insert(
        "position".to_string(),
        Field::list(FieldKind::Integer).postgis_geometry(POINT_GEOMETRY),
    );
    fields
}

/// A 3-D point bound to the supervoxel and root segment it lies in
pub fn bound_spatial_point() -> IndexMap<String, Field> {
    let mut fields = spatial_point();
    fields.insert("supervoxel_id".to_string(), Field::numeric().indexed());
    fields.insert("root_id".to_string(), Field::numeric().indexed());
    fields
}

/// Synapse between a presynaptic and a postsynaptic point
pub fn synapse() -> Schema {
    Schema::new("synapse")
        .field("pre_pt", Field::nested(bound_spatial_point()))
        .field("ctr_pt", Field::nested(spatial_point()))
        .field("post_pt", Field::nested(bound_spatial_point()))
        .field("size", Field::float())
}

/// Free-text tag attached to a bound point
pub fn bound_tag() -> Schema {
    Schema::new("bound_tag")
        .field("pt", Field::nested(bound_spatial_point()))
        .field("tag", Field::string())
}

/// Cell type assignment under a named classification system
pub fn cell_type_local() -> Schema {
    Schema::new("cell_type_local")
        .field("classification_system", Field::string().indexed())
        .field("cell_type", Field::string().indexed())
        .field("pt", Field::nested(bound_spatial_point()))
}

/// Bouton shape of a synapse's presynaptic side
pub fn presynaptic_bouton_type() -> Schema {
    Schema::reference("presynaptic_bouton_type", "synapse")
        .field("bouton_type", Field::string())
}

/// Compartment of a synapse's postsynaptic side
pub fn postsynaptic_compartment() -> Schema {
    Schema::reference("postsynaptic_compartment", "synapse")
        .field("compartment", Field::string())
}

/// Link between a segmented cell and a functional imaging ROI
pub fn functional_coregistration() -> Schema {
    Schema::new("functional_coregistration")
        .field("pt", Field::nested(bound_spatial_point()))
        .field("func_id", Field::integer().indexed())
}

/// Pairwise contact between two segments.
///
/// Not a registered annotation type; supplied directly when root entities are synthesized.
pub fn contact() -> Schema {
    Schema::new(CONTACT)
        .field("sidea_pt", Field::nested(bound_spatial_point()))
        .field("sideb_pt", Field::nested(bound_spatial_point()))
        .field("ctr_pt", Field::nested(spatial_point()))
        .field("size", Field::integer())
}

/// Every registered stock annotation type
pub fn all() -> Vec<Schema> {
    vec![
        synapse(),
        bound_tag(),
        cell_type_local(),
        presynaptic_bouton_type(),
        postsynaptic_compartment(),
        functional_coregistration(),
    ]
}
