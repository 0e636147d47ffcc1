// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use ledgerd::db::Db;
use ledgerd::models::CategoryPayload;
use ledgerd::service::Ledger;

fn payload(name: &str) -> CategoryPayload {
    CategoryPayload {
        name: name.to_string(),
        description: format!("{name} description"),
        parent_id: None,
    }
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    {
        let db = Db::open(&path, 0).unwrap();
        let ledger = Ledger::new(db.clone());
        ledger.create_category(payload("Food")).await.unwrap();
        drop(ledger);
        db.close();
    }

    let db = Db::open(&path, 2).unwrap();
    let ledger = Ledger::new(db);
    let categories = ledger.list_categories().await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Food");
}

#[tokio::test]
async fn readers_see_committed_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    let db = Db::open(&path, 3).unwrap();
    let ledger = Ledger::new(db);
    let id = ledger.create_category(payload("Food")).await.unwrap();

    // More reads than reader connections, so the round-robin wraps and
    // every reader serves at least one.
    for _ in 0..6 {
        let category = ledger.get_category(id).await.unwrap();
        assert_eq!(category.name, "Food");
    }
}

#[tokio::test]
async fn in_memory_database_shares_one_connection() {
    // Readers are forced to zero for :memory:; separate handles would
    // each get their own empty database.
    let db = Db::open(Path::new(":memory:"), 4).unwrap();
    let ledger = Ledger::new(db);
    ledger.create_category(payload("Food")).await.unwrap();

    for _ in 0..4 {
        let categories = ledger.list_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
    }
}

#[tokio::test]
async fn concurrent_writes_all_land() {
    let db = Db::open_in_memory().unwrap();
    let ledger = Ledger::new(db);

    let mut handles = Vec::new();
    for i in 0..16 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.create_category(payload(&format!("cat-{i}"))).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let categories = ledger.list_categories().await.unwrap();
    assert_eq!(categories.len(), 16);
}
