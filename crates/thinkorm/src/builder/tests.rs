use super::*;
use crate::condition::{CompareOp, Condition};
use crate::expression::Expression;
use crate::options::{
    FieldItem, FieldSpec, Join, JoinOn, JoinType, Limit, Logic, OrderItem, SoftDelete, SortDir,
    UnionBody, UnionItem, WhereEntry, WhereTree,
};
use crate::value::Value;

fn options(table: &str) -> Options {
    Options {
        table: vec![table.to_string()],
        ..Options::default()
    }
}

fn values(stmt: &Statement) -> Vec<Value> {
    stmt.params().iter().map(|p| p.value.clone()).collect()
}

#[test]
fn test_simple_select() {
    let stmt = Builder::generic().select(&options("think_user"));
    assert_eq!(stmt.sql(), "SELECT * FROM think_user");
    assert!(stmt.params().is_empty());
}

#[test]
fn test_single_equality() {
    let mut o = options("think_user");
    o.r#where.upsert_field(Logic::And, "id", vec![Condition::eq(1)]);
    let stmt = Builder::generic().select(&o);
    assert_eq!(stmt.sql(), "SELECT * FROM think_user WHERE id = ?");
    assert_eq!(values(&stmt), vec![Value::Int(1)]);
}

#[test]
fn test_clause_order() {
    let mut o = options("think_user");
    o.alias.insert("think_user".into(), "u".into());
    o.alias.insert("think_role".into(), "r".into());
    o.distinct = true;
    o.field = FieldSpec::List(vec![
        FieldItem::Column("u.id".into()),
        FieldItem::Aliased {
            column: "r.name".into(),
            alias: "role".into(),
        },
    ]);
    o.force = vec!["idx_status".into()];
    o.join.push(Join {
        table: "think_role".into(),
        ty: JoinType::Left,
        on: vec![JoinOn::Eq {
            left: "think_user.role_id".into(),
            right: "think_role.id".into(),
        }],
    });
    o.r#where
        .upsert_field(Logic::And, "u.status", vec![Condition::eq(1)]);
    o.group = Some("u.status".into());
    o.having = Some(Expression::new("COUNT(*) > 1"));
    o.order.push(OrderItem::Field {
        field: "u.id".into(),
        dir: Some(SortDir::Desc),
    });
    o.limit = Some(Limit::with_offset(10, 5));
    o.lock = Some("FOR UPDATE".into());
    o.comment = Some("list users".into());

    let stmt = Builder::generic().select(&o);
    assert_eq!(
        stmt.sql(),
        "SELECT DISTINCT u.id,r.name AS role FROM think_user u FORCE INDEX (idx_status) \
         LEFT JOIN think_role r ON u.role_id=r.id WHERE u.status = ? GROUP BY u.status \
         HAVING COUNT(*) > 1 ORDER BY u.id DESC LIMIT 10,5 FOR UPDATE /* list users */"
    );
}

#[test]
fn test_comment_cannot_close_early() {
    let mut o = options("t");
    o.comment = Some("a */ DROP".into());
    assert_eq!(Builder::generic().select(&o).sql(), "SELECT * FROM t /* a  DROP */");
}

#[test]
fn test_ledger_renders_as_conjunction() {
    let mut o = options("user");
    o.r#where.upsert_field(
        Logic::And,
        "age",
        vec![
            Condition::compare(CompareOp::Gt, 18),
            Condition::compare(CompareOp::Lt, 65),
        ],
    );
    o.r#where
        .push(Logic::Or, WhereEntry::Raw { expr: Expression::new("vip = 1"), binds: vec![] });
    let stmt = Builder::generic().select(&o);
    assert_eq!(
        stmt.sql(),
        "SELECT * FROM user WHERE ((age > ? AND age < ?)) OR ((vip = 1))"
    );
    assert_eq!(values(&stmt), vec![Value::Int(18), Value::Int(65)]);
}

#[test]
fn test_mixed_connectives() {
    let mut o = options("t");
    o.r#where.upsert_field(Logic::And, "a", vec![Condition::eq(1)]);
    o.r#where.upsert_field(Logic::And, "b", vec![Condition::eq(2)]);
    o.r#where.upsert_field(Logic::Or, "c", vec![Condition::eq(3)]);
    o.r#where.upsert_field(Logic::Xor, "d", vec![Condition::eq(4)]);
    let stmt = Builder::generic().select(&o);
    assert_eq!(
        stmt.sql(),
        "SELECT * FROM t WHERE (a = ? AND b = ?) OR (c = ?) XOR (d = ?)"
    );
    assert_eq!(
        values(&stmt),
        vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
    );
}

#[test]
fn test_or_fanout() {
    let mut o = options("t");
    o.r#where
        .upsert_field(Logic::And, "field1|field2", vec![Condition::eq("v")]);
    let stmt = Builder::generic().select(&o);
    assert_eq!(stmt.sql(), "SELECT * FROM t WHERE (field1 = ? OR field2 = ?)");
    assert_eq!(values(&stmt), vec![Value::from("v"), Value::from("v")]);
}

#[test]
fn test_and_fanout_with_ledger() {
    let mut o = options("t");
    o.r#where.upsert_field(
        Logic::And,
        "a&b",
        vec![Condition::compare(CompareOp::Egt, 1), Condition::NotNull],
    );
    let stmt = Builder::generic().select(&o);
    assert_eq!(
        stmt.sql(),
        "SELECT * FROM t WHERE ((a >= ? AND a IS NOT NULL) AND (b >= ? AND b IS NOT NULL))"
    );
    assert_eq!(values(&stmt), vec![Value::Int(1), Value::Int(1)]);
}

#[test]
fn test_condition_forms() {
    let mut o = options("t");
    o.r#where.upsert_field(Logic::And, "a", vec![Condition::in_list([1, 2, 3])]);
    o.r#where.upsert_field(Logic::And, "b", vec![Condition::not_in(Vec::<i32>::new())]);
    o.r#where.upsert_field(Logic::And, "c", vec![Condition::in_list(Vec::<i32>::new())]);
    o.r#where.upsert_field(Logic::And, "d", vec![Condition::between(1, 9)]);
    o.r#where.upsert_field(Logic::And, "e", vec![Condition::eq(Value::Null)]);
    o.r#where.upsert_field(Logic::And, "f", vec![Condition::exp("> score")]);
    o.r#where.upsert_field(
        Logic::And,
        "g",
        vec![Condition::CompareRaw {
            op: CompareOp::Eq,
            expr: Expression::new("h"),
        }],
    );
    let stmt = Builder::generic().select(&o);
    assert_eq!(
        stmt.sql(),
        "SELECT * FROM t WHERE a IN (?,?,?) AND 1=1 AND 1=0 AND d BETWEEN ? AND ? \
         AND e IS NULL AND (f > score) AND g = h"
    );
    assert_eq!(stmt.params().len(), 5);
}

#[test]
fn test_soft_delete_wraps_body() {
    let mut o = options("t");
    o.r#where.upsert_field(Logic::And, "a", vec![Condition::eq(1)]);
    o.r#where.upsert_field(Logic::Or, "b", vec![Condition::eq(2)]);
    o.soft_delete = Some(SoftDelete {
        field: "delete_time".into(),
        condition: Condition::Null,
    });
    let stmt = Builder::generic().select(&o);
    assert_eq!(
        stmt.sql(),
        "SELECT * FROM t WHERE ((a = ?) OR (b = ?)) AND delete_time IS NULL"
    );
}

#[test]
fn test_soft_delete_alone() {
    let mut o = options("t");
    o.soft_delete = Some(SoftDelete {
        field: "status".into(),
        condition: Condition::compare(CompareOp::Neq, -1),
    });
    let stmt = Builder::generic().select(&o);
    assert_eq!(stmt.sql(), "SELECT * FROM t WHERE status <> ?");
    assert_eq!(values(&stmt), vec![Value::Int(-1)]);
}

#[test]
fn test_nested_group() {
    let mut inner = WhereTree::new();
    inner.upsert_field(Logic::And, "b", vec![Condition::eq(2)]);
    inner.upsert_field(Logic::And, "c", vec![Condition::eq(3)]);
    let mut o = options("t");
    o.r#where.upsert_field(Logic::And, "a", vec![Condition::eq(1)]);
    o.r#where.push(Logic::And, WhereEntry::Group(inner));
    o.r#where.push(Logic::And, WhereEntry::Group(WhereTree::new()));
    let stmt = Builder::generic().select(&o);
    assert_eq!(stmt.sql(), "SELECT * FROM t WHERE a = ? AND (b = ? AND c = ?)");
}

#[test]
fn test_subquery_params_follow_placeholders() {
    let mut sub = options("think_role");
    sub.field = FieldSpec::List(vec![FieldItem::Column("user_id".into())]);
    sub.r#where.upsert_field(Logic::And, "role", vec![Condition::eq("admin")]);

    let mut union = options("archive");
    union.r#where.upsert_field(Logic::And, "year", vec![Condition::eq(2020)]);

    let mut o = options("think_user");
    o.r#where.upsert_field(Logic::And, "status", vec![Condition::eq(1)]);
    o.r#where.upsert_field(
        Logic::And,
        "id",
        vec![Condition::InQuery {
            query: Box::new(sub.clone()),
            negated: false,
        }],
    );
    o.r#where.push(
        Logic::And,
        WhereEntry::Exists {
            query: Box::new(sub),
            negated: true,
        },
    );
    o.union.push(UnionItem {
        all: true,
        body: UnionBody::Query(Box::new(union)),
    });
    o.limit = Some(Limit::new(10));

    let stmt = Builder::generic().select(&o);
    assert_eq!(
        stmt.sql(),
        "SELECT * FROM think_user WHERE status = ? \
         AND id IN (SELECT user_id FROM think_role WHERE role = ?) \
         AND NOT EXISTS (SELECT user_id FROM think_role WHERE role = ?) \
         UNION ALL (SELECT * FROM archive WHERE year = ?) LIMIT 10"
    );
    assert_eq!(
        values(&stmt),
        vec![
            Value::Int(1),
            Value::from("admin"),
            Value::from("admin"),
            Value::Int(2020)
        ]
    );
}

#[test]
fn test_placeholder_tables() {
    let mut o = options("__USER__");
    o.alias.insert("think_user".into(), "u".into());
    o.r#where
        .upsert_field(Logic::And, "__USER__.id", vec![Condition::eq(1)]);
    o.union.push(UnionItem {
        all: false,
        body: UnionBody::Raw(Expression::new("SELECT * FROM __USER_LOG__")),
    });
    let builder = Builder::generic().with_prefix("think_");
    let first = builder.select(&o);
    let second = builder.select(&o);
    assert_eq!(
        first.sql(),
        "SELECT * FROM think_user u WHERE u.id = ? UNION (SELECT * FROM think_user_log)"
    );
    assert_eq!(first, second);
}

#[test]
fn test_render_is_repeatable() {
    let mut o = options("t");
    o.r#where.upsert_field(Logic::And, "a|b", vec![Condition::eq(1)]);
    o.r#where.upsert_field(Logic::Or, "c", vec![Condition::in_list(["x", "y"])]);
    o.order.push(OrderItem::Raw(Expression::new("RAND()")));
    let builder = Builder::generic();
    assert_eq!(builder.select(&o), builder.select(&o));
}

#[test]
fn test_mysql_quotes_identifiers() {
    let mut o = options("think_user");
    o.alias.insert("think_user".into(), "u".into());
    o.field = FieldSpec::List(vec![
        FieldItem::Column("u.id".into()),
        FieldItem::Raw(Expression::new("COUNT(*) AS n")),
    ]);
    o.r#where.upsert_field(Logic::And, "u.name", vec![Condition::eq("a")]);
    o.order.push(OrderItem::Field {
        field: "id".into(),
        dir: None,
    });
    let stmt = Builder::new(Arc::new(Mysql)).select(&o);
    assert_eq!(
        stmt.sql(),
        "SELECT `u`.`id`,COUNT(*) AS n FROM `think_user` `u` WHERE `u`.`name` = ? ORDER BY `id`"
    );
}

#[test]
fn test_opaque_tables_pass_through() {
    let o = Options {
        table: vec!["(SELECT 1) tmp".into(), "a b c".into()],
        ..Options::default()
    };
    assert_eq!(
        Builder::generic().select(&o).sql(),
        "SELECT * FROM (SELECT 1) tmp,a b c"
    );
}

#[test]
fn test_fill_template_keeps_unknown_tokens() {
    let out = fill_template("A%X% %Y% 100%", |name| (name == "X").then_some("1"));
    assert_eq!(out, "A1 %Y% 100%");
}
