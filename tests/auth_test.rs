//! Authentication tests: local password hashes, the directory sentinel and
//! the choice between them.

mod common;

use quadmembers::auth::session::{PROFILE_PAGE, REQUESTS_PAGE, landing_page};
use quadmembers::auth::{self, password};
use common::*;

#[test]
fn test_hash_password_success() {
    let hash = password::hash_password(LOCAL_PASSWORD).expect("Failed to hash password");

    assert!(hash.starts_with("$argon2"));
    assert!(password::check_password(LOCAL_PASSWORD, &hash));
    assert!(!password::check_password("wrong", &hash));
}

#[test]
fn test_sentinel_never_verifies_locally() {
    assert!(password::is_ldap_managed(password::LDAP_MANAGED_PASSWORD));
    assert!(!password::check_password("invalid", password::LDAP_MANAGED_PASSWORD));
    assert!(!password::check_password("", password::LDAP_MANAGED_PASSWORD));
}

#[test]
fn test_hashes_are_not_the_sentinel() {
    let hash = password::hash_password(LOCAL_PASSWORD).expect("Failed to hash password");
    assert!(!password::is_ldap_managed(&hash));
}

#[actix_rt::test]
async fn test_ldap_account_checks_directory() {
    let (directory, stats) = FakeDirectory::accepting(LDAP_PASSWORD).into_directory();
    let user = ldap_user("jdoe");

    let ldap_ok = auth::check_account_password(&user, LDAP_PASSWORD, &directory).await;
    assert!(ldap_ok.expect("no error"));
    let local_ok = auth::check_account_password(&user, LOCAL_PASSWORD, &directory).await;
    assert!(!local_ok.expect("no error"));
    assert_eq!(stats.binds(), 2);
    assert_eq!(stats.unbinds(), 2);
}

#[actix_rt::test]
async fn test_local_account_checks_hash() {
    let (directory, stats) = FakeDirectory::accepting(LOCAL_PASSWORD).into_directory();
    let user = local_user("mvdberg");

    let ok = auth::check_account_password(&user, LOCAL_PASSWORD, &directory).await;
    assert!(ok.expect("no error"));
    assert_eq!(stats.connects(), 0);
}

#[actix_rt::test]
async fn test_directory_outage_is_an_error() {
    let (directory, _) = FakeDirectory::unreachable().into_directory();
    let user = ldap_user("jdoe");

    assert!(auth::check_account_password(&user, LDAP_PASSWORD, &directory).await.is_err());
}

#[test]
fn test_members_land_on_their_profile() {
    assert_eq!(landing_page(&ldap_user("jdoe")), PROFILE_PAGE);
    assert_eq!(landing_page(&local_user("mvdberg")), PROFILE_PAGE);

    let mut board_member = ldap_user("bestuur");
    board_member.is_staff = true;
    assert_eq!(landing_page(&board_member), PROFILE_PAGE);
}

#[test]
fn test_staff_without_person_lands_on_requests() {
    assert_eq!(landing_page(&bootstrap_admin("admin")), REQUESTS_PAGE);
}
