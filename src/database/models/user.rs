use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    app::AppError,
    database::{db_utils::last_insert_id, integrity::refuse_if_referenced, validate},
    schema::{blogs, comments, up_downs, user_fans, users},
};

pub const USERNAME_MAX: usize = 32;
pub const PASSWORD_MAX: usize = 64;
pub const NICKNAME_MAX: usize = 32;
pub const EMAIL_MAX: usize = 254;
pub const AVATAR_MAX: usize = 100;

#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Stored as given; hashing is the caller's business.
    pub password: String,
    pub nickname: String,
    pub email: String,
    /// Path of the uploaded avatar image.
    pub avatar: String,
    pub create_time: NaiveDateTime,
}

/** Fields supplied when registering an account */
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub nickname: &'a str,
    pub email: &'a str,
    pub avatar: &'a str,
}

#[derive(Insertable)]
#[table_name = "users"]
struct UserInsert<'a> {
    username: &'a str,
    password: &'a str,
    nickname: &'a str,
    email: &'a str,
    avatar: &'a str,
    create_time: NaiveDateTime,
}

/** Partial update of an account; `None` leaves the column untouched */
#[derive(Debug, Clone, Default, AsChangeset)]
#[table_name = "users"]
pub struct UserChanges<'a> {
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub nickname: Option<&'a str>,
    pub email: Option<&'a str>,
    pub avatar: Option<&'a str>,
}

impl NewUser<'_> {
    fn validate(&self) -> Result<(), AppError> {
        validate::required("users.username", self.username, USERNAME_MAX)?;
        validate::max_length("users.password", self.password, PASSWORD_MAX)?;
        validate::max_length("users.nickname", self.nickname, NICKNAME_MAX)?;
        validate::email("users.email", self.email, EMAIL_MAX)?;
        validate::max_length("users.avatar", self.avatar, AVATAR_MAX)
    }
}

impl UserChanges<'_> {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.nickname.is_none()
            && self.email.is_none()
            && self.avatar.is_none()
    }

    fn validate(&self) -> Result<(), AppError> {
        if let Some(username) = self.username {
            validate::required("users.username", username, USERNAME_MAX)?;
        }
        if let Some(password) = self.password {
            validate::max_length("users.password", password, PASSWORD_MAX)?;
        }
        if let Some(nickname) = self.nickname {
            validate::max_length("users.nickname", nickname, NICKNAME_MAX)?;
        }
        if let Some(email) = self.email {
            validate::email("users.email", email, EMAIL_MAX)?;
        }
        if let Some(avatar) = self.avatar {
            validate::max_length("users.avatar", avatar, AVATAR_MAX)?;
        }
        Ok(())
    }
}

impl User {
    /// Inserts a new account and returns the stored row.
    /// Fails with `UniquenessViolation` if the username or email is taken.
    ///
    /// # Example
    /// ```
    /// use blogsite_schema::database::{db_utils::establish_in_memory, models::user::*};
    ///
    /// let conn = establish_in_memory()?;
    /// let user = User::new(&conn, &NewUser {
    ///     username: "alice",
    ///     password: "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8",
    ///     nickname: "Alice",
    ///     email: "alice@example.com",
    ///     avatar: "avatars/alice.png",
    /// })?;
    /// assert_eq!(user.username, "alice");
    /// # Ok::<(), blogsite_schema::app::AppError>(())
    /// ```
    pub fn new(conn: &SqliteConnection, user: &NewUser) -> Result<User, AppError> {
        user.validate()?;

        let to_insert = UserInsert {
            username: user.username,
            password: user.password,
            nickname: user.nickname,
            email: user.email,
            avatar: user.avatar,
            create_time: Utc::now().naive_utc(),
        };

        conn.transaction::<User, AppError, _>(|| {
            diesel::insert_into(users::table)
                .values(&to_insert)
                .execute(conn)?;
            let id = last_insert_id(conn)?;
            debug!("created user {} ({})", id, user.username);

            User::find_by_id(conn, id)
        })
    }

    /** Returns the user with the id specified */
    pub fn find_by_id(conn: &SqliteConnection, user_id: i64) -> Result<User, AppError> {
        Ok(users::table.find(user_id).first(conn)?)
    }

    pub fn find_by_username(conn: &SqliteConnection, uname: &str) -> Result<Option<User>, AppError> {
        Ok(users::table
            .filter(users::username.eq(uname))
            .first(conn)
            .optional()?)
    }

    pub fn find_by_email(conn: &SqliteConnection, address: &str) -> Result<Option<User>, AppError> {
        Ok(users::table
            .filter(users::email.eq(address))
            .first(conn)
            .optional()?)
    }

    /// Applies `changes` and returns the updated row. The same length and
    /// uniqueness rules as [`User::new`] apply.
    pub fn edit(conn: &SqliteConnection, user_id: i64, changes: &UserChanges) -> Result<User, AppError> {
        changes.validate()?;
        if changes.is_empty() {
            return User::find_by_id(conn, user_id);
        }

        conn.transaction::<User, AppError, _>(|| {
            let updated = diesel::update(users::table.find(user_id))
                .set(changes)
                .execute(conn)?;
            if updated == 0 {
                return Err(AppError::NotFound);
            }

            User::find_by_id(conn, user_id)
        })
    }

    /** Deletes an user. Refused while a blog, follow edge, comment or vote still names it */
    pub fn delete(conn: &SqliteConnection, user_id: i64) -> Result<(), AppError> {
        conn.transaction::<(), AppError, _>(|| {
            let owned_blogs = blogs::table
                .filter(blogs::user_id.eq(user_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("user", user_id, "blogs", owned_blogs)?;

            let edges = user_fans::table
                .filter(user_fans::user_id.eq(user_id).or(user_fans::follower_id.eq(user_id)))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("user", user_id, "user_fans", edges)?;

            let written = comments::table
                .filter(comments::user_id.eq(user_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("user", user_id, "comments", written)?;

            let votes = up_downs::table
                .filter(up_downs::user_id.eq(user_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("user", user_id, "up_downs", votes)?;

            let deleted = diesel::delete(users::table.find(user_id)).execute(conn)?;
            if deleted == 0 {
                return Err(AppError::NotFound);
            }
            debug!("deleted user {}", user_id);
            Ok(())
        })
    }
}
