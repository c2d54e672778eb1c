//! End-to-end folder scenarios through the inventory service.

use certdeck_access::{AccessError, AccessPolicy, Inventory};
use certdeck_core::{AccessControl, CertificateRecord, CertificateStatus, Folder, FolderType, User};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn certificate(name: &str) -> CertificateRecord {
    CertificateRecord {
        id: Uuid::new_v4(),
        common_name: name.into(),
        subject: format!("O=Example Corp, CN={name}"),
        issuer: "O=Example Corp, CN=Example Root CA".into(),
        valid_from: now() - Duration::days(30),
        valid_to: now() + Duration::days(335),
        algorithm: "sha256WithRSAEncryption".into(),
        serial_number: "0A:1B:2C".into(),
        status: CertificateStatus::Valid,
        folder_id: None,
        fingerprint: format!("fingerprint-{name}"),
        subject_alt_names: vec![name.into()],
        is_ca: false,
        pem: String::new(),
        source: Some(format!("{name}.pem")),
        created_at: now(),
    }
}

#[tokio::test]
async fn deleting_folder_unassigns_its_certificates() {
    let inventory = Inventory::new(AccessPolicy::default(), 30);
    let admin = User::new("ada", "admin");

    let folder = inventory
        .create_folder(&admin, Folder::custom("F"))
        .await
        .unwrap();

    let mut c1 = certificate("c1.example.com");
    c1.folder_id = Some(folder);
    let mut c2 = certificate("c2.example.com");
    c2.folder_id = Some(folder);
    let elsewhere = certificate("c3.example.com");

    let c1 = inventory.add_certificate(&admin, c1).await.unwrap();
    let c2 = inventory.add_certificate(&admin, c2).await.unwrap();
    let c3 = inventory.add_certificate(&admin, elsewhere).await.unwrap();

    let affected = inventory.delete_folder(&admin, folder).await.unwrap();
    assert_eq!(affected, BTreeSet::from([c1, c2]));

    for id in [c1, c2, c3] {
        let record = inventory.certificate(&admin, id, now()).await.unwrap();
        assert_eq!(record.folder_id, None);
    }
    assert_eq!(inventory.certificate_count().await, 3);
    assert!(inventory.folders(&admin).await.is_empty());
}

#[tokio::test]
async fn system_folders_survive_delete_requests() {
    let inventory = Inventory::new(AccessPolicy::default(), 30);
    let admin = User::new("ada", "admin");

    let system = Folder::system("Production");
    let id = inventory.create_folder(&admin, system).await.unwrap();

    let err = inventory.delete_folder(&admin, id).await.unwrap_err();
    assert!(matches!(err, AccessError::SystemFolderProtected(f) if f == id));

    let folders = inventory.folders(&admin).await;
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].folder_type, FolderType::System);
}

#[tokio::test]
async fn moving_root_under_its_deepest_descendant_fails() {
    let inventory = Inventory::new(AccessPolicy::default(), 30);
    let admin = User::new("ada", "admin");

    let a = inventory
        .create_folder(&admin, Folder::custom("A"))
        .await
        .unwrap();
    let b = inventory
        .create_folder(&admin, Folder::custom("B").with_parent(a))
        .await
        .unwrap();
    let c = inventory
        .create_folder(&admin, Folder::custom("C").with_parent(b))
        .await
        .unwrap();
    let d = inventory
        .create_folder(&admin, Folder::custom("D").with_parent(c))
        .await
        .unwrap();

    let err = inventory.move_folder(&admin, a, Some(d)).await.unwrap_err();
    assert!(matches!(err, AccessError::Cycle { .. }));
    assert!(matches!(
        inventory.move_folder(&admin, c, Some(c)).await,
        Err(AccessError::Cycle { .. })
    ));

    // the tree is untouched and legal moves still work
    inventory.move_folder(&admin, d, Some(a)).await.unwrap();
    let folders = inventory.folders(&admin).await;
    let a_folder = folders.iter().find(|f| f.id == a).unwrap();
    assert!(a_folder.is_root());
    let d_folder = folders.iter().find(|f| f.id == d).unwrap();
    assert_eq!(d_folder.parent_id, Some(a));
}

#[tokio::test]
async fn viewer_is_refused_folder_writes() {
    let inventory = Inventory::new(AccessPolicy::default(), 30);
    let admin = User::new("ada", "admin");
    let viewer = User::new("vera", "viewer");

    let f = inventory
        .create_folder(&admin, Folder::custom("F"))
        .await
        .unwrap();

    assert!(matches!(
        inventory.create_folder(&viewer, Folder::custom("G")).await,
        Err(AccessError::Denied { .. })
    ));
    assert!(matches!(
        inventory.move_folder(&viewer, f, None).await,
        Err(AccessError::Denied { .. })
    ));
    assert_eq!(inventory.folders(&viewer).await.len(), 1);
}

#[tokio::test]
async fn inactive_users_see_nothing() {
    let inventory = Inventory::new(AccessPolicy::default(), 30);
    let admin = User::new("ada", "admin");
    inventory
        .add_certificate(&admin, certificate("a.example.com"))
        .await
        .unwrap();

    let former = User::new("former", "admin").deactivated();
    assert!(inventory.visible_certificates(&former, now()).await.is_empty());
    assert!(inventory.folders(&former).await.is_empty());
}

#[tokio::test]
async fn expiry_at_exact_instant_reads_as_expired() {
    let inventory = Inventory::new(AccessPolicy::default(), 30);
    let admin = User::new("ada", "admin");
    let mut record = certificate("edge.example.com");
    record.valid_to = now();
    let id = inventory.add_certificate(&admin, record).await.unwrap();

    let read = inventory.certificate(&admin, id, now()).await.unwrap();
    assert_eq!(read.status, CertificateStatus::Expired);
}

#[tokio::test]
async fn reused_certificate_id_cannot_replace_restricted_record() {
    let inventory = Inventory::new(AccessPolicy::default(), 30);
    let admin = User::new("ada", "admin");
    let manager = User::new("max", "manager");

    let vault = inventory
        .create_folder(
            &admin,
            Folder::custom("vault").with_access_control(AccessControl::default().with_role("admin")),
        )
        .await
        .unwrap();
    let mut original = certificate("vault.example.com");
    original.folder_id = Some(vault);
    let id = inventory.add_certificate(&admin, original).await.unwrap();

    let mut forged = certificate("forged.example.com");
    forged.id = id;
    let err = inventory.add_certificate(&manager, forged).await.unwrap_err();
    assert!(matches!(err, AccessError::DuplicateCertificate(dup) if dup == id));
    assert_eq!(err.status_code(), 409);

    let kept = inventory.certificate(&admin, id, now()).await.unwrap();
    assert_eq!(kept.common_name, "vault.example.com");
    assert_eq!(kept.folder_id, Some(vault));
    assert_eq!(inventory.certificate_count().await, 1);
}
