use modelcheck_core::{
    declaration::{DeclarationKind, TypeDescriptor},
    span::LineIndex,
};
use modelcheck_parser::parse;

const RAINIER: &str = r#"import ballerina/persist as _;
import ballerina/time;

# Gender of an employee.
public enum Gender {
    MALE,
    FEMALE
}

public type Employee record {|
    readonly string empNo;
    string firstName;
    string lastName;
    time:Date birthDate;
    Gender gender;
    time:Date hireDate;

    Department department;
    Workspace workspace;
|};

public type Workspace record {|
    readonly string workspaceId;
    string workspaceType;

    Building location;
    Employee[] employees;
|};

public type Building record {|
    readonly string buildingCode;
    string city;
    string state;
    string country;
    string postalCode;
    string 'type;

    Workspace[] workspaces;
|};

public type Department record {|
    readonly string deptNo;
    string deptName;

    Employee[] employees;
|};
"#;

#[test]
fn parses_a_complete_model() {
    let declarations = parse(RAINIER).expect("model should parse");

    let names: Vec<String> = declarations
        .iter()
        .filter_map(|declaration| declaration.name())
        .map(|name| name.inner().to_name())
        .collect();
    assert_eq!(
        names,
        ["Gender", "Employee", "Workspace", "Building", "Department"]
    );

    assert!(matches!(declarations[0].kind(), DeclarationKind::Enum(_)));
    for record in &declarations[1..] {
        let record = record.as_record().expect("record declaration");
        assert!(record.is_closed());
        assert_eq!(
            record
                .members()
                .iter()
                .filter(|member| member.qualifiers().readonly)
                .count(),
            1
        );
    }
}

#[test]
fn quoted_identifiers_lose_their_quote() {
    let declarations = parse(RAINIER).unwrap();
    let building = declarations[3].as_record().unwrap();

    let field = building
        .members()
        .iter()
        .find(|member| member.name().is_some_and(|name| *name.inner() == "type"))
        .expect("quoted field");
    assert_eq!(*field.ty().inner(), TypeDescriptor::named("string"));
}

#[test]
fn spans_map_to_source_lines() {
    let declarations = parse(RAINIER).unwrap();
    let index = LineIndex::new(RAINIER);

    let employee = &declarations[1];
    let name = employee.name().unwrap();
    assert_eq!(index.range(name.span()).to_string(), "(9:12,9:20)");

    let record = employee.as_record().unwrap();
    assert_eq!(
        index.range(record.descriptor_span()).to_string(),
        "(9:21,19:2)"
    );

    let department = &record.members()[6];
    assert_eq!(
        index.range(department.span()).to_string(),
        "(17:4,17:26)"
    );
}

#[test]
fn syntax_errors_are_collected_per_item() {
    let source = "type A record {| int |};\nfunction f( {\n type B record {| readonly int id; |};";
    let err = parse(source).unwrap_err();

    assert!(!err.diagnostics().is_empty());
    assert!(
        err.diagnostics()
            .iter()
            .all(|diag| diag.severity().is_error() && diag.primary_span().is_some())
    );
}
