use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

use crate::{
    crd::{BackingType, LinstorStoragePool, LinstorStoragePoolSource, SourcePolicy},
    validation::{
        Causes, FieldPath,
        exclusive::{ConflictPlacement, exactly_one},
    },
};

const POOL_NAME_MAX_LEN: usize = 48;

// LINSTOR accepts the same characters for storage pool names as for node names
static POOL_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,47}$").expect("failed to compile pool name regex")
});

/// Validates every entry of `pools`, which is found at `path`.
///
/// Entries are checked in order and all causes are collected. Within one
/// entry the backing type cardinality is checked first, followed by the name
/// and, if exactly one backing type is set, the type-specific fields and the
/// device source.
pub fn validate_storage_pools(causes: &mut Causes, path: &FieldPath, pools: &[LinstorStoragePool]) {
    let mut names = BTreeSet::new();

    for (index, pool) in pools.iter().enumerate() {
        let path = path.index(index);

        let backing_type = exactly_one(
            causes,
            &path,
            "backing type",
            ConflictPlacement::SecondMember,
            pool.backing_type_fields(),
        );

        validate_pool_name(causes, &path.child("name"), &pool.name, &mut names);

        if let Some(backing_type) = backing_type {
            validate_backing_type(causes, &path.child(backing_type.field_name()), backing_type);
            validate_source(causes, &path.child("source"), backing_type, pool.source.as_ref());
        }
    }
}

fn validate_pool_name<'a>(
    causes: &mut Causes,
    path: &FieldPath,
    name: &'a str,
    names: &mut BTreeSet<&'a str>,
) {
    if name.is_empty() {
        causes.required(path.clone(), "storage pool name must be specified");
        return;
    }

    if !POOL_NAME_REGEX.is_match(name) {
        causes.invalid(
            path.clone(),
            name,
            format_args!(
                "must be no more than {POOL_NAME_MAX_LEN} characters, start with an alphanumeric character and only contain alphanumeric characters, '_' or '-'"
            ),
        );
    }

    if !names.insert(name) {
        causes.duplicate(path.clone(), name);
    }
}

fn validate_backing_type(causes: &mut Causes, path: &FieldPath, backing_type: BackingType<'_>) {
    match backing_type {
        BackingType::LvmThin(lvm_thin) => {
            if lvm_thin.volume_group.is_empty() {
                causes.required(path.child("volumeGroup"), "volume group must be specified");
            }
            if lvm_thin.thin_pool.is_empty() {
                causes.required(path.child("thinPool"), "thin pool must be specified");
            }
        }
        BackingType::ZfsThin(zfs) | BackingType::Zfs(zfs) => {
            if zfs.z_pool.is_empty() {
                causes.required(path.child("zPool"), "zpool must be specified");
            }
        }
        BackingType::FileThin(file) | BackingType::File(file) => {
            if !file.directory.is_empty() && !file.directory.starts_with('/') {
                causes.invalid(
                    path.child("directory"),
                    &file.directory,
                    "must be an absolute path",
                );
            }
        }
        BackingType::Unmanaged(unmanaged) => {
            if unmanaged.pool.is_empty() {
                causes.required(path.child("pool"), "pool must be specified");
            }
        }
        // The volume group defaults to the pool name
        BackingType::Lvm(_) => {}
    }
}

fn validate_source(
    causes: &mut Causes,
    path: &FieldPath,
    backing_type: BackingType<'_>,
    source: Option<&LinstorStoragePoolSource>,
) {
    let Some(source) = source else {
        return;
    };

    if backing_type.source_policy() == SourcePolicy::Forbidden {
        causes.forbidden(
            path.clone(),
            format_args!(
                "{} storage pools can't be created from host devices",
                backing_type.field_name()
            ),
        );
        return;
    }

    let path = path.child("hostDevices");
    if source.host_devices.is_empty() {
        causes.required(path, "at least one device must be specified");
        return;
    }

    let mut devices = BTreeSet::new();
    for (index, device) in source.host_devices.iter().enumerate() {
        if !device.starts_with("/dev/") || device.len() == "/dev/".len() {
            causes.invalid(path.index(index), device, "must be a device path below /dev/");
        } else if !devices.insert(device.as_str()) {
            causes.duplicate(path.index(index), device);
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;

    fn validate(yaml: &str) -> Vec<String> {
        let pools: Vec<LinstorStoragePool> =
            serde_yaml::from_str(yaml).expect("test YAML is valid");

        let mut causes = Causes::new();
        validate_storage_pools(
            &mut causes,
            &FieldPath::new("spec").child("storagePools"),
            &pools,
        );

        causes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn missing_and_multiple_types() {
        let causes = validate(indoc! {"
            - name: missing-type
            - name: multiple-types
              lvm: {}
              lvmThin: {}
            - name: valid-pool
              lvm: {}
        "});

        assert_eq!(
            causes,
            [
                "spec.storagePools.0: Required value: at least one backing type must be specified",
                "spec.storagePools.1.lvm: Forbidden: exactly one backing type allowed",
            ]
        );
    }

    #[test]
    fn valid_pools() {
        let causes = validate(indoc! {"
            - name: thinpool
              lvmThin:
                volumeGroup: linstor_thinpool
                thinPool: thinpool
              source:
                hostDevices:
                  - /dev/vdb
            - name: vg1
              lvm:
                volumeGroup: vg1
            - name: zfs
              zfsThin:
                zPool: tank
            - name: sparse
              fileThin:
                directory: /var/lib/linstor-pools/sparse
            - name: existing
              unmanaged:
                pool: existing
        "});

        assert!(causes.is_empty(), "unexpected causes: {causes:?}");
    }

    #[rstest]
    #[case::thin_pool_incomplete(
        indoc! {"
            - name: thin
              lvmThin:
                volumeGroup: vg
        "},
        &["spec.storagePools.0.lvmThin.thinPool: Required value: thin pool must be specified"],
    )]
    #[case::zpool_missing(
        indoc! {"
            - name: zfs
              zfs: {}
        "},
        &["spec.storagePools.0.zfs.zPool: Required value: zpool must be specified"],
    )]
    #[case::relative_directory(
        indoc! {"
            - name: file
              file:
                directory: pools/file
        "},
        &["spec.storagePools.0.file.directory: Invalid value: \"pools/file\": must be an absolute path"],
    )]
    #[case::source_on_file_pool(
        indoc! {"
            - name: file
              file: {}
              source:
                hostDevices: [/dev/vdb]
        "},
        &["spec.storagePools.0.source: Forbidden: file storage pools can't be created from host devices"],
    )]
    #[case::empty_source(
        indoc! {"
            - name: vg
              lvm: {}
              source: {}
        "},
        &["spec.storagePools.0.source.hostDevices: Required value: at least one device must be specified"],
    )]
    #[case::bad_devices(
        indoc! {"
            - name: vg
              lvm: {}
              source:
                hostDevices: [/dev/vdb, vdc, /dev/vdb]
        "},
        &[
            "spec.storagePools.0.source.hostDevices.1: Invalid value: \"vdc\": must be a device path below /dev/",
            "spec.storagePools.0.source.hostDevices.2: Duplicate value: \"/dev/vdb\"",
        ],
    )]
    #[case::duplicate_name(
        indoc! {"
            - name: pool
              lvm: {}
            - name: pool
              zfs:
                zPool: tank
        "},
        &["spec.storagePools.1.name: Duplicate value: \"pool\""],
    )]
    #[case::missing_name_and_type(
        indoc! {"
            - lvm: {}
            - name: 'not valid!'
        "},
        &[
            "spec.storagePools.0.name: Required value: storage pool name must be specified",
            "spec.storagePools.1: Required value: at least one backing type must be specified",
            "spec.storagePools.1.name: Invalid value: \"not valid!\": must be no more than 48 characters, start with an alphanumeric character and only contain alphanumeric characters, '_' or '-'",
        ],
    )]
    fn invalid_pools(#[case] yaml: &str, #[case] expected: &[&str]) {
        assert_eq!(validate(yaml), expected);
    }
}
