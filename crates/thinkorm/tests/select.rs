use thinkorm::prelude::*;
use thinkorm::{DialectKind, Param};

fn config() -> QueryConfig {
    QueryConfig::new().with_prefix("think_")
}

#[test]
fn list_page_with_filters() {
    let mut q = Query::new(config());
    q.table("__USER__ u")
        .field("u.id, u.name")
        .r#where("u.status", 1)
        .where_op("u.age", ">", 18)
        .where_op("u.age", "<", 65)
        .order("u.id desc")
        .page(2, 10);

    let stmt = q.select().unwrap();
    assert_eq!(
        stmt.sql(),
        "SELECT u.id,u.name FROM think_user u WHERE u.status = ? AND (u.age > ? AND u.age < ?) \
         ORDER BY u.id DESC LIMIT 10,10"
    );
    assert_eq!(
        stmt.to_real_sql(),
        "SELECT u.id,u.name FROM think_user u WHERE u.status = 1 AND (u.age > 18 AND u.age < 65) \
         ORDER BY u.id DESC LIMIT 10,10"
    );
}

#[test]
fn search_with_grouped_alternatives() {
    let mut q = Query::new(config());
    q.table("__USER__")
        .where_op("name|nickname", "like", "think%")
        .where_group(|g| {
            g.r#where("status", 1).where_or("role", "admin");
        });

    let stmt = q.fetch_sql(true).find().unwrap();
    assert_eq!(
        stmt.sql(),
        "SELECT * FROM think_user WHERE (name LIKE ? OR nickname LIKE ?) AND ((status = ?) OR (role = ?)) LIMIT 1"
    );
    assert!(stmt.fetch_sql());
    assert_eq!(
        stmt.to_real_sql(),
        "SELECT * FROM think_user WHERE (name LIKE 'think%' OR nickname LIKE 'think%') \
         AND ((status = 1) OR (role = 'admin')) LIMIT 1"
    );
}

#[test]
fn one_query_builds_many_statements() {
    let mut q = Query::new(config());
    q.name("UserLog").bind("tenant", 7);

    q.where_raw("tenant_id = :tenant", Vec::<Param>::new());
    let first = q.select().unwrap();
    assert_eq!(first.sql(), "SELECT * FROM think_user_log WHERE (tenant_id = :tenant)");

    q.where_raw("tenant_id = :tenant AND id > ?", [100]);
    let second = q.find().unwrap();
    assert_eq!(
        second.to_real_sql(),
        "SELECT * FROM think_user_log WHERE (tenant_id = 7 AND id > 100) LIMIT 1"
    );
    let (_, params) = second.into_parts();
    assert_eq!(params.len(), 2);
}

#[test]
fn errors_do_not_poison_the_query() {
    let mut q = Query::new(config());
    q.table("user").where_op("id", "between", 1);
    let err = q.select().unwrap_err();
    assert!(err.is_validation());

    q.table("user").where_op("id", "between", [1, 9]);
    assert_eq!(
        q.select().unwrap().sql(),
        "SELECT * FROM user WHERE id BETWEEN ? AND ?"
    );
}

#[test]
fn primary_key_lookups() {
    let mut q = Query::new(config().with_composite_pk(["user_id", "role_id"]));
    q.table("think_user_role");
    let stmt = q
        .find_by_pk(PkData::map([("role_id", 3), ("user_id", 1)]))
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "SELECT * FROM think_user_role WHERE user_id = ? AND role_id = ? LIMIT 1"
    );

    q.table("think_user_role");
    let err = q.find_by_pk(PkData::map([("user_id", 1)])).unwrap_err();
    assert!(err.is_missing_composite_key());
    assert_eq!(err.to_string(), "Missing composite primary key data for column 'role_id'");
}

#[test]
fn config_from_json_drives_rendering() {
    let cfg = QueryConfig::from_json(
        r#"{ "prefix": "think_", "default_page_size": 5, "dialect": "mysql" }"#,
    )
    .unwrap();
    assert_eq!(cfg.dialect, DialectKind::Mysql);

    let mut q = Query::new(cfg);
    q.table("__USER__ u").r#where("u.id", 1).page(3, 0);
    assert_eq!(
        q.select().unwrap().sql(),
        "SELECT * FROM `think_user` `u` WHERE `u`.`id` = ? LIMIT 10,5"
    );
}

#[test]
fn options_document_serializes() {
    let mut q = Query::new(config());
    q.table("user").r#where("id", 1).limit(1);
    let options = q.normalize().unwrap();
    let json = serde_json::to_value(&options).unwrap();
    assert_eq!(json["table"][0], "user");
    assert_eq!(json["limit"]["count"], 1);

    let builder = Builder::from_config(q.config());
    assert_eq!(builder.select(&options).sql(), "SELECT * FROM user WHERE id = ? LIMIT 1");
}
