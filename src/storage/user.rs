//! User store
//!
//! Profile, password hash and per-user config are written separately: a
//! password change never touches the profile and neither touches the config.

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::batch::{Batch, Statement};
use super::cascade::{delete_tree, Scope};
use super::marshal::{self, text, Record, Scan};
use super::password::{Bcrypt, PasswordHasher};
use super::show::show_exists;
use crate::domain::{validate_user_id, User, UserConfig};
use crate::error::{Error, Result};

impl Record for User {
    const TABLE: &'static str = "users";
    /// `hashed_password` is written on its own and never read into a `User`
    const COLUMNS: &'static [&'static str] = &[
        "userid",
        "kor_name",
        "name",
        "team",
        "role",
        "email",
        "phone_number",
        "entry_date",
    ];
    const KEY_LEN: usize = 1;

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.kor_name),
            text(&self.name),
            text(&self.team),
            text(&self.role),
            text(&self.email),
            text(&self.phone_number),
            text(&self.entry_date),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut c = Scan::new(row);
        Ok(Self {
            id: c.string()?,
            kor_name: c.string()?,
            name: c.string()?,
            team: c.string()?,
            role: c.string()?,
            email: c.string()?,
            phone_number: c.string()?,
            entry_date: c.string()?,
        })
    }
}

impl Record for UserConfig {
    const TABLE: &'static str = "user_configs";
    const COLUMNS: &'static [&'static str] = &["userid", "current_show"];
    const KEY_LEN: usize = 1;

    fn values(&self) -> Vec<Value> {
        vec![text(&self.userid), text(&self.current_show)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut c = Scan::new(row);
        Ok(Self {
            userid: c.string()?,
            current_show: c.string()?,
        })
    }
}

fn check_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::bad_request("password must not be empty"));
    }
    Ok(())
}

/// Adds a user with an empty profile, hashing the password with bcrypt
pub fn add_user(conn: &mut Connection, id: &str, password: &str) -> Result<()> {
    add_user_with(conn, id, password, &Bcrypt::default())
}

/// Adds a user and an empty config row, hashing the password with `hasher`
pub fn add_user_with(
    conn: &mut Connection,
    id: &str,
    password: &str,
    hasher: &dyn PasswordHasher,
) -> Result<()> {
    let user = User::new(id);
    user.validate()?;
    check_password(password)?;
    if user_exists(conn, id)? {
        return Err(Error::already_exists("user", id));
    }
    let hashed = hasher.hash(password)?;

    let mut batch = Batch::new();
    batch.push(
        marshal::marshal(&user)
            .with("hashed_password", Value::Text(hashed))
            .into_insert(User::TABLE),
    );
    batch.push(marshal::insert(&UserConfig::new(id)));
    batch.exec(conn)?;

    info!(user = id, "user added");
    Ok(())
}

pub fn user_exists(conn: &Connection, id: &str) -> Result<bool> {
    validate_user_id(id)?;
    marshal::exists::<User, _>(conn, id)
}

pub fn get_user(conn: &Connection, id: &str) -> Result<User> {
    validate_user_id(id)?;
    marshal::select_by_key(conn, id)?.ok_or_else(|| Error::not_found("user", id))
}

/// Every user, ordered by id
pub fn users(conn: &Connection) -> Result<Vec<User>> {
    marshal::select_where(conn, "ORDER BY userid", [])
}

/// Overwrites the profile; the password hash is left alone
pub fn update_user(conn: &mut Connection, user: &User) -> Result<()> {
    user.validate()?;
    if !user_exists(conn, &user.id)? {
        return Err(Error::not_found("user", &user.id));
    }
    Batch::single(marshal::update(user)).exec(conn)?;
    info!(user = %user.id, "user updated");
    Ok(())
}

pub fn update_user_password(conn: &mut Connection, id: &str, password: &str) -> Result<()> {
    update_user_password_with(conn, id, password, &Bcrypt::default())
}

pub fn update_user_password_with(
    conn: &mut Connection,
    id: &str,
    password: &str,
    hasher: &dyn PasswordHasher,
) -> Result<()> {
    check_password(password)?;
    if !user_exists(conn, id)? {
        return Err(Error::not_found("user", id));
    }
    let hashed = hasher.hash(password)?;
    Batch::single(Statement::new(
        "UPDATE users SET hashed_password = ?1 WHERE userid = ?2",
        vec![Value::Text(hashed), text(id)],
    ))
    .exec(conn)?;
    info!(user = id, "password changed");
    Ok(())
}

/// Returns true if `password` matches the stored hash of the user
pub fn user_password_match(conn: &Connection, id: &str, password: &str) -> Result<bool> {
    user_password_match_with(conn, id, password, &Bcrypt::default())
}

pub fn user_password_match_with(
    conn: &Connection,
    id: &str,
    password: &str,
    hasher: &dyn PasswordHasher,
) -> Result<bool> {
    validate_user_id(id)?;
    let hashed: Option<String> = conn
        .query_row(
            "SELECT hashed_password FROM users WHERE userid = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    let hashed = hashed.ok_or_else(|| Error::not_found("user", id))?;
    Ok(hasher.verify(password, &hashed))
}

/// Deletes a user and their config
pub fn delete_user(conn: &mut Connection, id: &str) -> Result<()> {
    if !user_exists(conn, id)? {
        return Err(Error::not_found("user", id));
    }
    delete_tree(conn, Scope::User(id))
}

pub fn get_user_config(conn: &Connection, id: &str) -> Result<UserConfig> {
    validate_user_id(id)?;
    marshal::select_by_key(conn, id)?.ok_or_else(|| Error::not_found("user config", id))
}

/// Overwrites a user's config; a non-empty current show must exist
pub fn update_user_config(conn: &mut Connection, config: &UserConfig) -> Result<()> {
    validate_user_id(&config.userid)?;
    if !user_exists(conn, &config.userid)? {
        return Err(Error::not_found("user", &config.userid));
    }
    if !config.current_show.is_empty() && !show_exists(conn, &config.current_show)? {
        return Err(Error::not_found("show", &config.current_show));
    }

    // Users created before configs existed have no row yet.
    let stmt = marshal::insert(config);
    let stmt = Statement::new(
        format!(
            "{} ON CONFLICT (userid) DO UPDATE SET current_show = excluded.current_show",
            stmt.sql
        ),
        stmt.params,
    );
    Batch::single(stmt).exec(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Show;
    use crate::storage::schema::init_tables;
    use crate::storage::show::{add_show, delete_show};

    fn fast() -> Bcrypt {
        Bcrypt::new(4).unwrap()
    }

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn password_roundtrip() {
        let mut conn = conn();
        add_user_with(&mut conn, "kybin", "pw1", &fast()).unwrap();
        assert!(user_password_match_with(&conn, "kybin", "pw1", &fast()).unwrap());
        assert!(!user_password_match_with(&conn, "kybin", "pw2", &fast()).unwrap());

        update_user_password_with(&mut conn, "kybin", "pw2", &fast()).unwrap();
        assert!(user_password_match_with(&conn, "kybin", "pw2", &fast()).unwrap());
        assert!(!user_password_match_with(&conn, "kybin", "pw1", &fast()).unwrap());
    }

    #[test]
    fn match_on_missing_user_is_not_found() {
        let conn = conn();
        let err = user_password_match_with(&conn, "ghost", "pw", &fast()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn profile_update_keeps_password() {
        let mut conn = conn();
        add_user_with(&mut conn, "kybin", "pw", &fast()).unwrap();

        let mut user = get_user(&conn, "kybin").unwrap();
        user.name = "Kim Yongbin".to_string();
        user.team = "rnd".to_string();
        update_user(&mut conn, &user).unwrap();

        assert_eq!(get_user(&conn, "kybin").unwrap(), user);
        assert!(user_password_match_with(&conn, "kybin", "pw", &fast()).unwrap());
    }

    #[test]
    fn rejects_bad_input() {
        let mut conn = conn();
        assert!(add_user_with(&mut conn, "ky bin", "pw", &fast()).unwrap_err().is_bad_request());
        assert!(add_user_with(&mut conn, "kybin", "", &fast()).unwrap_err().is_bad_request());

        add_user_with(&mut conn, "kybin", "pw", &fast()).unwrap();
        assert!(add_user_with(&mut conn, "kybin", "pw", &fast()).unwrap_err().is_bad_request());
    }

    #[test]
    fn config_is_separate() {
        let mut conn = conn();
        add_show(&mut conn, &Show::new("TEST")).unwrap();
        add_user_with(&mut conn, "kybin", "pw", &fast()).unwrap();
        assert_eq!(get_user_config(&conn, "kybin").unwrap().current_show, "");

        let mut cfg = UserConfig::new("kybin");
        cfg.current_show = "TEST".to_string();
        update_user_config(&mut conn, &cfg).unwrap();
        update_user_password_with(&mut conn, "kybin", "other", &fast()).unwrap();
        assert_eq!(get_user_config(&conn, "kybin").unwrap(), cfg);

        cfg.current_show = "NOPE".to_string();
        assert!(update_user_config(&mut conn, &cfg).unwrap_err().is_not_found());

        delete_show(&mut conn, "TEST").unwrap();
        assert_eq!(get_user_config(&conn, "kybin").unwrap().current_show, "");
    }

    #[test]
    fn delete_removes_config() {
        let mut conn = conn();
        add_user_with(&mut conn, "kybin", "pw", &fast()).unwrap();
        add_user_with(&mut conn, "alice", "pw", &fast()).unwrap();
        delete_user(&mut conn, "kybin").unwrap();

        assert!(get_user(&conn, "kybin").unwrap_err().is_not_found());
        assert!(get_user_config(&conn, "kybin").unwrap_err().is_not_found());
        let ids: Vec<String> = users(&conn).unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["alice"]);
    }
}
