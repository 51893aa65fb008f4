use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A LINSTOR storage pool, configured on every selected satellite.
///
/// Exactly one of the backing type fields must be set. They are declared in
/// the order in which validation scans them, thin variants first.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinstorStoragePool {
    /// Name of the storage pool in LINSTOR.
    #[serde(default)]
    pub name: String,

    /// Configures a LVM Thin Pool as storage pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lvm_thin: Option<LinstorStoragePoolLvmThin>,

    /// Configures a LVM Volume Group as storage pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lvm: Option<LinstorStoragePoolLvm>,

    /// Configures a thinly provisioned ZFS pool as storage pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zfs_thin: Option<LinstorStoragePoolZfs>,

    /// Configures a ZFS pool as storage pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zfs: Option<LinstorStoragePoolZfs>,

    /// Configures a sparse-file backed storage pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_thin: Option<LinstorStoragePoolFile>,

    /// Configures a file backed storage pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<LinstorStoragePoolFile>,

    /// Registers storage that already exists on the node and is not managed
    /// by the satellite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unmanaged: Option<LinstorStoragePoolUnmanaged>,

    /// The devices backing the pool, prepared by the satellite before the
    /// pool is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<LinstorStoragePoolSource>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinstorStoragePoolLvm {
    /// Name of the volume group. Defaults to the name of the storage pool.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub volume_group: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinstorStoragePoolLvmThin {
    /// Name of the volume group containing the thin pool.
    #[serde(default)]
    pub volume_group: String,

    /// Name of the thin pool (logical volume) inside the volume group.
    #[serde(default)]
    pub thin_pool: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinstorStoragePoolZfs {
    /// Name of the zpool.
    #[serde(default, rename = "zPool")]
    pub z_pool: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinstorStoragePoolFile {
    /// Directory holding the backing files. Defaults to
    /// `/var/lib/linstor-pools/<name>`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub directory: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinstorStoragePoolUnmanaged {
    /// Name of the existing pool as known to the storage layer of the node.
    #[serde(default)]
    pub pool: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinstorStoragePoolSource {
    /// Raw block devices used to create the pool, e.g. `/dev/vdb`.
    #[serde(default)]
    pub host_devices: Vec<String>,
}

/// Whether a backing type may be combined with a [`LinstorStoragePoolSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourcePolicy {
    /// The pool can reference existing storage or be created from devices.
    Optional,

    /// The pool references pre-existing storage, devices can't be used.
    Forbidden,
}

/// The backing type of a [`LinstorStoragePool`], after it was established that
/// exactly one was set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackingType<'a> {
    LvmThin(&'a LinstorStoragePoolLvmThin),
    Lvm(&'a LinstorStoragePoolLvm),
    ZfsThin(&'a LinstorStoragePoolZfs),
    Zfs(&'a LinstorStoragePoolZfs),
    FileThin(&'a LinstorStoragePoolFile),
    File(&'a LinstorStoragePoolFile),
    Unmanaged(&'a LinstorStoragePoolUnmanaged),
}

impl BackingType<'_> {
    /// The serialized name of the field holding this backing type.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::LvmThin(_) => "lvmThin",
            Self::Lvm(_) => "lvm",
            Self::ZfsThin(_) => "zfsThin",
            Self::Zfs(_) => "zfs",
            Self::FileThin(_) => "fileThin",
            Self::File(_) => "file",
            Self::Unmanaged(_) => "unmanaged",
        }
    }

    pub fn source_policy(&self) -> SourcePolicy {
        match self {
            Self::LvmThin(_) | Self::Lvm(_) | Self::ZfsThin(_) | Self::Zfs(_) => {
                SourcePolicy::Optional
            }
            Self::FileThin(_) | Self::File(_) | Self::Unmanaged(_) => SourcePolicy::Forbidden,
        }
    }
}

impl LinstorStoragePool {
    /// Returns every backing type field together with its parsed value, in
    /// declaration order.
    pub fn backing_type_fields(&self) -> [(&'static str, Option<BackingType<'_>>); 7] {
        [
            ("lvmThin", self.lvm_thin.as_ref().map(BackingType::LvmThin)),
            ("lvm", self.lvm.as_ref().map(BackingType::Lvm)),
            ("zfsThin", self.zfs_thin.as_ref().map(BackingType::ZfsThin)),
            ("zfs", self.zfs.as_ref().map(BackingType::Zfs)),
            ("fileThin", self.file_thin.as_ref().map(BackingType::FileThin)),
            ("file", self.file.as_ref().map(BackingType::File)),
            ("unmanaged", self.unmanaged.as_ref().map(BackingType::Unmanaged)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_type_fields_follow_declaration_order() {
        let pool = LinstorStoragePool {
            name: "multiple-types".to_owned(),
            lvm: Some(LinstorStoragePoolLvm::default()),
            lvm_thin: Some(LinstorStoragePoolLvmThin::default()),
            ..Default::default()
        };

        let set = pool
            .backing_type_fields()
            .into_iter()
            .filter_map(|(name, backing)| backing.map(|b| (name, b.field_name())))
            .collect::<Vec<_>>();

        assert_eq!(set, [("lvmThin", "lvmThin"), ("lvm", "lvm")]);
    }

    #[test]
    fn file_pools_forbid_sources() {
        let file = LinstorStoragePoolFile::default();

        assert_eq!(BackingType::File(&file).source_policy(), SourcePolicy::Forbidden);
        assert_eq!(
            BackingType::Lvm(&LinstorStoragePoolLvm::default()).source_policy(),
            SourcePolicy::Optional
        );
    }
}
