//! Example demonstrating thinkorm's declarative SELECT builder.
//!
//! Run with:
//!   cargo run --example select -p thinkorm

use colored::Colorize;
use thinkorm::prelude::*;
use thinkorm::{DialectKind, SortDir};

fn show(title: &str, stmt: &Statement) {
    println!("{}", title.bold().cyan());
    println!("  sql:    {}", stmt.sql());
    let params: Vec<String> = stmt.params().iter().map(|p| p.value.to_literal()).collect();
    println!("  params: [{}]", params.join(", "));
    println!("  real:   {}", stmt.to_real_sql().green());
    println!();
}

fn main() -> OrmResult<()> {
    let config = QueryConfig::new().with_prefix("think_");
    let mut q = Query::new(config.clone());

    // Repeated conditions on one field all apply.
    q.table("__USER__ u")
        .field("u.id, u.name, r.title as role")
        .left_join("__ROLE__ r", "__USER__.role_id = __ROLE__.id")
        .r#where("u.status", 1)
        .where_op("u.age", ">", 18)
        .where_op("u.age", "<", 65)
        .order_by("u.id", SortDir::Desc)
        .page(2, 10);
    show("paged list", &q.select()?);

    // Fan-out and closure groups.
    q.name("User")
        .where_op("name|nickname", "like", "think%")
        .where_group(|g| {
            g.r#where("status", 1).where_or("role", "admin");
        });
    show("search", &q.find()?);

    // Subqueries carry their params in placeholder order.
    q.name("User")
        .where_in_query("id", |s| {
            s.table("think_order").field("user_id").where_op("amount", ">=", 100);
        })
        .soft_delete("delete_time", Condition::Null);
    show("subquery + soft delete", &q.select()?);

    // Composite primary keys need every column.
    let mut pk = Query::new(config.clone().with_composite_pk(["user_id", "role_id"]));
    pk.table("think_user_role");
    show(
        "composite key",
        &pk.find_by_pk(PkData::map([("user_id", 1), ("role_id", 2)]))?,
    );

    pk.table("think_user_role");
    if let Err(err) = pk.find_by_pk(PkData::map([("user_id", 1)])) {
        println!("{} {err}\n", "rejected:".bold().red());
    }

    // Identifier quoting comes from the dialect.
    let mut my = Query::new(config.with_dialect(DialectKind::Mysql));
    my.table("__USER__").r#where("name", "O'Brien").lock(true);
    show("mysql", &my.find()?);

    Ok(())
}
