//! Query generation through the public facade.

use ujquery::prelude::*;

fn field_set() -> FieldSet {
    FieldSet::new()
        .with("plain_field", FieldSpec::new())
        .with("fallback", FieldSpec::from_fields(["orig_a1", "orig_a2"]))
        .with("so_fld1", FieldSpec::new().in_sub_object("sub_obj"))
        .with("so_fld2", FieldSpec::new().in_sub_object("sub_obj"))
        .with(
            "so_fld3",
            FieldSpec::from_fields(["so_fld3_orig"]).in_sub_object("sub_obj"),
        )
}

fn registry() -> K8sAuditFieldSet {
    K8sAuditFieldSet::new(field_set())
}

fn render(reg: &K8sAuditFieldSet, fields: &[&str]) -> Result<String, QueryGenError> {
    UserJourneyQuery::new("idx", reg)
        .with_fields(fields.iter().copied())
        .render()
}

#[test]
fn plain_field_passes_through() {
    let q = render(&registry(), &["plain_field"]).unwrap();
    assert_eq!(
        q,
        r#"search index="idx" log_type=audit|eval plain_field=mvindex('plain_field', 0)|fields plain_field|fields - _*"#
    );
}

#[test]
fn fallback_chain() {
    let q = render(&registry(), &["fallback"]).unwrap();
    assert!(
        q.contains("|eval fallback=if(isnull('orig_a1'),'orig_a2','orig_a1')|"),
        "{q}"
    );
}

#[test]
fn fallback_arity() {
    for n in 1..=5usize {
        let sources: Vec<String> = (1..=n).map(|i| format!("src{i}")).collect();
        let reg = K8sAuditFieldSet::new(
            FieldSet::new().with("f", FieldSpec::from_fields(sources.iter())),
        );
        let q = render(&reg, &["f"]).unwrap();
        let eval = q
            .split('|')
            .find(|stage| stage.starts_with("eval f="))
            .unwrap();

        assert_eq!(eval.matches("if(isnull(").count(), n - 1, "{eval}");
        let innermost = format!("'src{n}'");
        assert!(eval.contains(&innermost), "{eval}");
    }
}

#[test]
fn sub_object_aggregation() {
    let q = render(&registry(), &["so_fld3", "so_fld1"]).unwrap();
    assert!(
        q.contains(r#"|eval sub_obj=json_object("so_fld1",'so_fld1',"so_fld3",'so_fld3_orig')|"#),
        "{q}"
    );
    assert_eq!(q.matches("json_object(").count(), 1);
    assert!(q.ends_with("|fields sub_obj|fields - _*"));
}

#[test]
fn selection_set_is_sorted_union() {
    let q = render(
        &registry(),
        &["so_fld2", "plain_field", "fallback", "so_fld1", "plain_field"],
    )
    .unwrap();
    assert!(q.ends_with("|fields fallback,plain_field,sub_obj|fields - _*"), "{q}");
}

#[test]
fn unknown_field_yields_no_text() {
    let err = render(&registry(), &["plain_field", "no_such_field"]).unwrap_err();
    assert_eq!(err, QueryGenError::UnknownField("no_such_field".into()));
    assert_eq!(err.to_string(), r#"no field specification for: "no_such_field""#);
}

#[test]
fn renders_are_deterministic() {
    let reg = registry();
    let build = || {
        UserJourneyQuery::new("idx", &reg)
            .with_predicate("verb=create")
            .with_filter(StatusConditionFilter::new("Ready"))
            .with_fields(["so_fld3", "fallback", "so_fld1", "status_message", "plain_field"])
            .render()
            .unwrap()
    };
    let first = build();
    for _ in 0..10 {
        assert_eq!(build(), first);
    }
}

struct Fixed(&'static str);

impl Filter for Fixed {
    fn commands(&self) -> Vec<String> {
        vec![format!("eval marker={}", self.0)]
    }

    fn field_set(&self) -> FieldSet {
        FieldSet::new().with("x", FieldSpec::from_expr(self.0))
    }
}

#[test]
fn second_filter_wins() {
    let reg = registry();
    let q = UserJourneyQuery::new("idx", &reg)
        .with_filter(Fixed("1"))
        .with_filter(Fixed("2"))
        .with_fields(["x"])
        .render()
        .unwrap();
    assert!(q.contains(" | eval marker=1 | eval marker=2|"), "{q}");
    assert!(q.contains("|eval x=2|"), "{q}");
}

#[test]
fn status_condition_reasons() {
    let reg = registry();
    let q = UserJourneyQuery::new("idx", &reg)
        .with_filter(StatusConditionFilter::new("Succeeded").with_reasons(["Completed", "Failed"]))
        .with_fields(["status_reason"])
        .render()
        .unwrap();

    let idx = "status_condition_index";
    assert!(
        q.contains(&format!(
            r#" | eval {idx}=mvfind('responseObject.status.conditions{{}}.type', "Succeeded")"#
        )),
        "{q}"
    );
    assert!(
        q.contains(&format!(
            r#" | where isnotnull({idx}) AND mvindex('responseObject.status.conditions{{}}.reason', {idx}) IN ("Completed", "Failed")"#
        )),
        "{q}"
    );
    assert!(
        q.contains(&format!(
            r#"properties=json_object("status_reason",mvindex('responseObject.status.conditions{{}}.reason', {idx}))"#
        )),
        "{q}"
    );
}

#[test]
fn catalog_renders_against_default_registry() {
    let descs = catalog::describe_all("idx", default_registry()).unwrap();
    assert_eq!(descs.len(), catalog::CATALOG.len());
    for desc in &descs {
        assert!(desc.query.starts_with(r#"search index="idx" log_type=audit "#));
        assert!(desc.query.ends_with("|fields - _*"));
    }

    let machine = machine_print_queries(&descs);
    assert_eq!(machine.split('\0').count(), descs.len());
    let pretty = pretty_print_queries(&descs);
    assert!(pretty.starts_with("Application events\n"));
}

#[test]
fn default_registry_is_shared() {
    assert!(std::ptr::eq(journey::default_registry(), default_registry()));
}
