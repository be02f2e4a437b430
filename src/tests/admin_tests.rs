#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::error::AppError;
    use crate::tests::common::TestApp;
    use crate::types::{BoxType, ImportLibraryRecord, LibraryLocation, UserProfile};

    #[tokio::test]
    async fn test_create_library_seeds_inventory_once() {
        let app = TestApp::new().await;

        let created = app.state.admin.create_library("X").await.unwrap();
        let err = app.state.admin.create_library("X").await.unwrap_err();

        assert_eq!(created.name, "X");
        assert!(matches!(err, AppError::Conflict(_)));
        let rows = app.state.inventory.list_for_library(created.id).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.quantity == 0));
        let libraries = app.state.admin.list_libraries().await.unwrap();
        assert_eq!(libraries.len(), 1);
    }

    #[tokio::test]
    async fn test_create_library_trims_and_requires_name() {
        let app = TestApp::new().await;

        assert!(matches!(app.state.admin.create_library("   ").await, Err(AppError::Validation(_))));
        let created = app.state.admin.create_library("  Vashon  ").await.unwrap();
        assert_eq!(created.name, "Vashon");
        assert!(matches!(app.state.admin.create_library("Vashon").await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_user_rules() {
        let app = TestApp::new().await;
        let library_id = app.library("White Center").await;

        let user = app.state.admin.create_user("wc", "secret123", library_id, false).await.unwrap();
        assert_eq!(user.library_name, "White Center");
        assert!(!user.is_admin);

        let dup = app.state.admin.create_user("wc", "another1", library_id, false).await.unwrap_err();
        assert!(matches!(dup, AppError::Conflict(_)));

        let missing_lib = app.state.admin.create_user("wc2", "secret123", 4242, false).await.unwrap_err();
        assert!(matches!(missing_lib, AppError::InvalidInput(_)));

        let short = app.state.admin.create_user("wc3", "12345", library_id, false).await.unwrap_err();
        match short {
            AppError::Validation(errors) => assert_eq!(errors[0].field, "password"),
            other => panic!("expected Validation, got {:?}", other),
        }

        let users = app.state.admin.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        let json = serde_json::to_string(&users).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("$2"));
    }

    #[tokio::test]
    async fn test_list_users_ordered_by_username() {
        let app = TestApp::new().await;
        let library_id = app.library("Valley View").await;
        for name in ["zed", "amy", "mo"] {
            app.user(name, "secret123", library_id, false).await;
        }

        let names: Vec<_> = app.state.admin.list_users().await.unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["amy", "mo", "zed"]);
    }

    #[tokio::test]
    async fn test_import_libraries() {
        let app = TestApp::new().await;
        let existing = app.library("Woodmont").await;
        let admin = app.user("root", "secret123", existing, true).await;

        let mut quantities = BTreeMap::new();
        quantities.insert("Kids".to_string(), 45);
        quantities.insert("EL".to_string(), 35);
        let mut bad_quantities = BTreeMap::new();
        bad_quantities.insert("Adults".to_string(), 1);

        let records = vec![
            ImportLibraryRecord {
                name: "Woodmont".into(),
                location: LibraryLocation {
                    short_name: Some("WDM".into()),
                    address: Some("26809 Pacific Hwy S".into()),
                    latitude: Some(47.36),
                    longitude: Some(-122.3),
                },
                quantities: BTreeMap::new(),
            },
            ImportLibraryRecord {
                name: "Maple Valley".into(),
                location: LibraryLocation { latitude: Some(47.39), longitude: Some(-122.04), ..Default::default() },
                quantities,
            },
            ImportLibraryRecord { name: " ".into(), location: LibraryLocation::default(), quantities: BTreeMap::new() },
            ImportLibraryRecord { name: "Bogus".into(), location: LibraryLocation::default(), quantities: bad_quantities },
        ];

        let report = app.state.admin.import_libraries(&admin, records).await.unwrap();

        assert_eq!((report.created, report.updated, report.skipped), (1, 1, 2));
        let libraries = app.state.admin.list_libraries().await.unwrap();
        let names: Vec<_> = libraries.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Maple Valley", "Woodmont"]);
        let woodmont = &libraries[1];
        assert_eq!(woodmont.short_name.as_deref(), Some("WDM"));
        assert_eq!(woodmont.latitude, Some(47.36));

        let maple = libraries[0].id;
        let rows = app.state.inventory.list_for_library(maple).await.unwrap();
        let kids = rows.iter().find(|r| r.box_type == BoxType::Kids).unwrap();
        assert_eq!(kids.quantity, 45);
        assert_eq!(app.history_count(maple).await, 2);

        let map = app.state.inventory.map_snapshot().await.unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[0].total_boxes, 80);
    }

    #[tokio::test]
    async fn test_import_keeps_unspecified_location_fields() {
        let app = TestApp::new().await;
        let library_id = app.library("Renton Highlands").await;
        let admin = app.user("root", "secret123", library_id, true).await;
        let record = |location: LibraryLocation| ImportLibraryRecord {
            name: "Renton Highlands".into(),
            location,
            quantities: BTreeMap::new(),
        };

        app.state
            .admin
            .import_libraries(&admin, vec![record(LibraryLocation { address: Some("2801 NE 10th St".into()), ..Default::default() })])
            .await
            .unwrap();
        app.state
            .admin
            .import_libraries(&admin, vec![record(LibraryLocation { short_name: Some("RHL".into()), ..Default::default() })])
            .await
            .unwrap();

        let library = app.state.admin.list_libraries().await.unwrap().remove(0);
        assert_eq!(library.address.as_deref(), Some("2801 NE 10th St"));
        assert_eq!(library.short_name.as_deref(), Some("RHL"));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_idempotent() {
        let app = TestApp::new().await;
        let cfg = app.state.config.bootstrap.clone();

        app.state.admin.ensure_bootstrap_admin(&cfg).await.unwrap();
        app.state.admin.ensure_bootstrap_admin(&cfg).await.unwrap();

        let users = app.state.admin.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_admin);
        assert_eq!(users[0].library_name, cfg.admin_library);
        let inventory = app.state.inventory.list_for_library(users[0].library_id).await.unwrap();
        assert_eq!(inventory.len(), 3);

        let login = app.state.auth.login(&cfg.admin_username, &cfg.admin_password).await.unwrap();
        assert!(login.user.is_admin);
    }

    #[tokio::test]
    async fn test_failed_import_record_rolls_back_alone() {
        let app = TestApp::new().await;
        let home = app.library("Admin Library").await;
        let admin = app.user("root", "secret123", home, true).await;
        // No such user, so the history rows of any quantity write violate their foreign key.
        let ghost = UserProfile { id: 999_999, ..admin.clone() };

        let mut quantities = BTreeMap::new();
        quantities.insert("Teens".to_string(), 8);
        let records = vec![
            ImportLibraryRecord {
                name: "Renton".into(),
                location: LibraryLocation { address: Some("100 Mill Ave S".into()), ..Default::default() },
                quantities: BTreeMap::new(),
            },
            ImportLibraryRecord { name: "Skyway".into(), location: LibraryLocation::default(), quantities },
        ];

        let err = app.state.admin.import_libraries(&ghost, records).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)), "{:?}", err);

        let libraries = app.state.admin.list_libraries().await.unwrap();
        let names: Vec<_> = libraries.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Admin Library", "Renton"]);
        assert_eq!(libraries[1].address.as_deref(), Some("100 Mill Ave S"));

        let orphaned: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM box_inventory bi LEFT JOIN libraries l ON bi.library_id = l.id WHERE l.id IS NULL",
        )
        .fetch_one(app.pool())
        .await
        .unwrap();
        assert_eq!(orphaned, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_user_creation() {
        let app = TestApp::new().await;
        let library_id = app.library("Auburn").await;

        let mut handles = Vec::new();
        for i in 0..30 {
            let admin = app.state.admin.clone();
            handles.push(tokio::spawn(async move {
                admin.create_user(&format!("auburn{:02}", i), "secret123", library_id, false).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(app.state.admin.list_users().await.unwrap().len(), 30);

        let mut handles = Vec::new();
        for _ in 0..5 {
            let admin = app.state.admin.clone();
            handles.push(tokio::spawn(async move {
                admin.create_user("auburn_dup", "secret123", library_id, false).await
            }));
        }
        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AppError::Conflict(_)) => {}
                Err(other) => panic!("expected Conflict, got {:?}", other),
            }
        }
        assert_eq!(created, 1);
    }
}
