use chrono::NaiveDate;
use student_registry::db::{count_students, fetch_students, insert_student, student_exists};
use student_registry::{
    open_store, Branch, CommandError, Course, Gender, Outcome, SearchFilters, Session,
    StudentField, StudentRecord,
};
use tempfile::TempDir;

fn ada() -> StudentRecord {
    StudentRecord {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        roll_number: "R100".to_string(),
        email: "ada@example.com".to_string(),
        mobile: "9000000001".to_string(),
        alt_mobile: "9000000002".to_string(),
        branch: Branch::Cse,
        course: Course::BTech,
        gender: Gender::Female,
        dob: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        address: "12 Analytical Lane".to_string(),
    }
}

fn open_session(dir: &TempDir) -> Session {
    let conn = open_store(&dir.path().join("students.sqlite")).unwrap();
    let mut session = Session::new(conn);
    session.load().unwrap();
    session
}

fn fill_form(session: &mut Session, record: &StudentRecord) {
    let form = session.form_mut();
    form.set_text(StudentField::FirstName, record.first_name.as_str());
    form.set_text(StudentField::LastName, record.last_name.as_str());
    form.set_text(StudentField::RollNumber, record.roll_number.as_str());
    form.set_text(StudentField::Email, record.email.as_str());
    form.set_text(StudentField::Mobile, record.mobile.as_str());
    form.set_text(StudentField::AltMobile, record.alt_mobile.as_str());
    form.set_text(StudentField::Address, record.address.as_str());
    form.select_branch(Some(record.branch));
    form.select_course(Some(record.course));
    form.select_gender(Some(record.gender));
    form.set_date(record.dob);
}

fn row_index(session: &Session, roll_number: &str) -> usize {
    session
        .records()
        .rows()
        .iter()
        .position(|record| record.roll_number == roll_number)
        .unwrap()
}

#[test]
fn create_update_delete_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&dir);

    fill_form(&mut session, &ada());
    let saved = session.save().unwrap();
    assert_eq!(
        saved,
        Outcome::Saved {
            roll_number: "R100".to_string()
        }
    );
    assert!(student_exists(session.connection(), "R100").unwrap());
    assert!(session.form().is_cleared());

    let index = row_index(&session, "R100");
    assert!(session.activate_row(index));
    session
        .form_mut()
        .set_text(StudentField::Email, "countess@example.com");
    session.update().unwrap();

    let stored = fetch_students(session.connection()).unwrap();
    let mut expected = ada();
    expected.email = "countess@example.com".to_string();
    assert_eq!(stored, vec![expected]);
    assert_eq!(session.records().rows(), stored.as_slice());

    let index = row_index(&session, "R100");
    session.activate_row(index);
    let pending = session.begin_delete().unwrap();
    session.confirm_delete(pending).unwrap();

    assert!(!student_exists(session.connection(), "R100").unwrap());
    assert!(session.records().is_empty());
    session.close().unwrap();
}

#[test]
fn records_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&dir);
    fill_form(&mut session, &ada());
    session.save().unwrap();
    session.close().unwrap();

    let session = open_session(&dir);
    assert_eq!(session.records().rows(), &[ada()]);
}

#[test]
fn duplicate_roll_number_leaves_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&dir);
    insert_student(session.connection(), &ada()).unwrap();

    let mut twin = ada();
    twin.first_name = "Augusta".to_string();
    fill_form(&mut session, &twin);

    let err = session.save().unwrap_err();
    assert!(matches!(err, CommandError::DuplicateKey(ref roll) if roll == "R100"));
    assert_eq!(count_students(session.connection()).unwrap(), 1);
    assert_eq!(session.form().text(StudentField::FirstName), "Augusta");
}

#[test]
fn branch_search_returns_exactly_matching_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&dir);
    let branches = [Branch::Cse, Branch::Ece, Branch::Cse, Branch::Civil];
    for (index, branch) in branches.iter().enumerate() {
        let mut record = ada();
        record.roll_number = format!("R{index}");
        record.branch = *branch;
        insert_student(session.connection(), &record).unwrap();
    }

    session.form_mut().select_branch(Some(Branch::Cse));
    let outcome = session.search().unwrap();
    assert_eq!(outcome, Outcome::Searched { matches: 2 });

    let rolls: Vec<_> = session
        .records()
        .rows()
        .iter()
        .map(|record| record.roll_number.as_str())
        .collect();
    assert_eq!(rolls, ["R0", "R2"]);

    let direct = student_registry::db::search_students(
        session.connection(),
        &SearchFilters::new().with(StudentField::Branch, "CSE"),
    )
    .unwrap();
    assert_eq!(session.records().rows(), direct.as_slice());
}

#[test]
fn save_ignores_the_loaded_row_and_inserts() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&dir);
    fill_form(&mut session, &ada());
    session.save().unwrap();

    session.activate_row(0);
    session.form_mut().set_text(StudentField::RollNumber, "R101");
    session.save().unwrap();

    let rolls: Vec<_> = fetch_students(session.connection())
        .unwrap()
        .into_iter()
        .map(|record| record.roll_number)
        .collect();
    assert_eq!(rolls, ["R100", "R101"]);
}
