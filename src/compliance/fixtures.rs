//! Component workspaces for tests.

use super::ComplianceData;
use std::fs;
use std::path::Path;

pub(crate) const EC2_YAML: &str = r#"name: Amazon Elastic Compute Cloud
key: EC2
responsible_role: AWS Staff
references:
  - name: Reference
    path: http://VerificationURL.com
    type: URL
satisfies:
  - standard_key: NIST-800-53
    control_key: CM-2
    narrative:
      - key: a
        text: Justification in narrative form A for CM-2
      - key: b
        text: Justification in narrative form B for CM-2
    implementation_status: partial
  - standard_key: PCI-DSS-MAY-2015
    control_key: "1.1"
    narrative:
      - text: Justification in narrative form for 1.1
    parameters:
      - key: a
        text: Parameter A for 1.1
  - standard_key: PCI-DSS-MAY-2015
    control_key: "2.1"
    narrative:
      - text: Justification in narrative form for 2.1
  - standard_key: NIST-800-53
    control_key: AC-2
    narrative:
      - text: Accounts & roles are reviewed <quarterly>
"#;

pub(crate) const S3_YAML: &str = r#"name: Amazon Simple Storage Service
satisfies:
  - standard_key: NIST-800-53
    control_key: CM-2
    narrative:
      - text: S3 keeps versioned baselines
    control_origin: inherited
"#;

/// Write `components/<dir>/component.yaml` for every entry under `root`.
pub(crate) fn write_workspace(root: &Path, components: &[(&str, &str)]) {
    for (dir, yaml) in components {
        let component_dir = root.join("components").join(dir);
        fs::create_dir_all(&component_dir).expect("create component dir");
        fs::write(component_dir.join("component.yaml"), yaml).expect("write component.yaml");
    }
}

/// EC2 and S3 loaded through the workspace loader.
pub(crate) fn sample_data() -> ComplianceData {
    let dir = tempfile::tempdir().expect("create temp dir");
    write_workspace(dir.path(), &[("EC2", EC2_YAML), ("S3", S3_YAML)]);
    ComplianceData::load_dir(dir.path()).expect("load sample workspace")
}
