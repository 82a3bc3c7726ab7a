use std::collections::HashMap;

use crate::compression_config::{MeshEdgebreakerConnectivityEncodingMethod, MeshTraversalMethod};
use crate::status::DracoError;
use crate::version::DEFAULT_MESH_VERSION;

#[derive(Debug, Clone, Default)]
pub struct EncoderOptions {
    global_options: HashMap<String, i32>,
    attribute_options: HashMap<i32, HashMap<String, i32>>,
}

impl EncoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_encoding_speed(&self) -> i32 {
        self.get_global_int("encoding_speed", 5)
    }

    pub fn set_encoding_speed(&mut self, speed: i32) {
        self.set_global_int("encoding_speed", speed);
    }

    /// Connectivity variant. Slower speed settings default to the valence
    /// coder.
    pub fn get_edgebreaker_method(
        &self,
    ) -> Result<MeshEdgebreakerConnectivityEncodingMethod, DracoError> {
        let default_method = if self.get_encoding_speed() >= 5 { 0 } else { 2 };
        match self.get_global_int("edgebreaker_method", default_method) {
            0 => Ok(MeshEdgebreakerConnectivityEncodingMethod::Standard),
            2 => Ok(MeshEdgebreakerConnectivityEncodingMethod::Valence),
            other => Err(DracoError::InvalidParameter(format!(
                "Unsupported edgebreaker method: {}",
                other
            ))),
        }
    }

    pub fn set_edgebreaker_method(&mut self, method: MeshEdgebreakerConnectivityEncodingMethod) {
        self.set_global_int("edgebreaker_method", method as i32);
    }

    /// Traversal used to order the values of attribute `att_id`.
    pub fn get_traversal_method(&self, att_id: i32) -> Result<MeshTraversalMethod, DracoError> {
        let default_method = if self.get_encoding_speed() == 0 { 1 } else { 0 };
        MeshTraversalMethod::try_from(self.get_attribute_int(
            att_id,
            "traversal_method",
            default_method,
        ))
    }

    pub fn set_traversal_method(&mut self, att_id: i32, method: MeshTraversalMethod) {
        self.set_attribute_int(att_id, "traversal_method", method as i32);
    }

    pub fn set_version(&mut self, major: u8, minor: u8) {
        self.set_global_int("version_major", major as i32);
        self.set_global_int("version_minor", minor as i32);
    }

    pub fn get_version(&self) -> (u8, u8) {
        let major = self.get_global_int("version_major", -1);
        let minor = self.get_global_int("version_minor", -1);
        if major < 0 || minor < 0 {
            DEFAULT_MESH_VERSION
        } else {
            (major as u8, minor as u8)
        }
    }

    pub fn set_global_int(&mut self, key: &str, value: i32) {
        self.global_options.insert(key.to_string(), value);
    }

    pub fn get_global_int(&self, key: &str, default_val: i32) -> i32 {
        *self.global_options.get(key).unwrap_or(&default_val)
    }

    pub fn set_attribute_int(&mut self, att_id: i32, key: &str, value: i32) {
        self.attribute_options
            .entry(att_id)
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Looks `key` up for one attribute, falling back to the global table.
    pub fn get_attribute_int(&self, att_id: i32, key: &str, default_val: i32) -> i32 {
        self.attribute_options
            .get(&att_id)
            .and_then(|opts| opts.get(key))
            .copied()
            .unwrap_or_else(|| self.get_global_int(key, default_val))
    }
}
