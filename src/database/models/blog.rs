use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    app::AppError,
    database::{
        db_utils::last_insert_id,
        integrity::{refuse_if_referenced, require_user},
        validate,
    },
    schema::{articles, blogs, categories, tags},
};

pub const TITLE_MAX: usize = 64;
pub const SITE_MAX: usize = 32;
pub const THEME_MAX: usize = 32;

/** The single blog a user owns, addressed by its `site` slug */
#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub site: String,
    pub theme: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Insertable)]
#[table_name = "blogs"]
pub struct NewBlog<'a> {
    pub title: &'a str,
    pub site: &'a str,
    pub theme: &'a str,
    pub user_id: i64,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[table_name = "blogs"]
pub struct BlogChanges<'a> {
    pub title: Option<&'a str>,
    pub site: Option<&'a str>,
    pub theme: Option<&'a str>,
}

impl NewBlog<'_> {
    fn validate(&self) -> Result<(), AppError> {
        validate::max_length("blogs.title", self.title, TITLE_MAX)?;
        validate::required("blogs.site", self.site, SITE_MAX)?;
        validate::max_length("blogs.theme", self.theme, THEME_MAX)
    }
}

impl BlogChanges<'_> {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.site.is_none() && self.theme.is_none()
    }

    fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = self.title {
            validate::max_length("blogs.title", title, TITLE_MAX)?;
        }
        if let Some(site) = self.site {
            validate::required("blogs.site", site, SITE_MAX)?;
        }
        if let Some(theme) = self.theme {
            validate::max_length("blogs.theme", theme, THEME_MAX)?;
        }
        Ok(())
    }
}

impl Blog {
    /// Opens the blog of `blog.user_id`. A user owns at most one blog and a
    /// site slug is taken at most once; both surface as `UniquenessViolation`.
    pub fn new(conn: &SqliteConnection, blog: &NewBlog) -> Result<Blog, AppError> {
        blog.validate()?;

        conn.transaction::<Blog, AppError, _>(|| {
            require_user(conn, blog.user_id)?;
            diesel::insert_into(blogs::table).values(blog).execute(conn)?;
            let id = last_insert_id(conn)?;
            debug!("created blog {} at site {}", id, blog.site);

            Blog::find_by_id(conn, id)
        })
    }

    pub fn find_by_id(conn: &SqliteConnection, blog_id: i64) -> Result<Blog, AppError> {
        Ok(blogs::table.find(blog_id).first(conn)?)
    }

    pub fn find_by_site(conn: &SqliteConnection, slug: &str) -> Result<Option<Blog>, AppError> {
        Ok(blogs::table
            .filter(blogs::site.eq(slug))
            .first(conn)
            .optional()?)
    }

    /** Returns the blog owned by the user specified, if they opened one */
    pub fn find_by_user(conn: &SqliteConnection, owner: i64) -> Result<Option<Blog>, AppError> {
        Ok(blogs::table
            .filter(blogs::user_id.eq(owner))
            .first(conn)
            .optional()?)
    }

    pub fn edit(conn: &SqliteConnection, blog_id: i64, changes: &BlogChanges) -> Result<Blog, AppError> {
        changes.validate()?;
        if changes.is_empty() {
            return Blog::find_by_id(conn, blog_id);
        }

        conn.transaction::<Blog, AppError, _>(|| {
            let updated = diesel::update(blogs::table.find(blog_id))
                .set(changes)
                .execute(conn)?;
            if updated == 0 {
                return Err(AppError::NotFound);
            }

            Blog::find_by_id(conn, blog_id)
        })
    }

    /** Deletes a blog that no longer holds categories, tags or articles */
    pub fn delete(conn: &SqliteConnection, blog_id: i64) -> Result<(), AppError> {
        conn.transaction::<(), AppError, _>(|| {
            let owned = categories::table
                .filter(categories::blog_id.eq(blog_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("blog", blog_id, "categories", owned)?;

            let owned = tags::table
                .filter(tags::blog_id.eq(blog_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("blog", blog_id, "tags", owned)?;

            let owned = articles::table
                .filter(articles::blog_id.eq(blog_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("blog", blog_id, "articles", owned)?;

            let deleted = diesel::delete(blogs::table.find(blog_id)).execute(conn)?;
            if deleted == 0 {
                return Err(AppError::NotFound);
            }
            debug!("deleted blog {}", blog_id);
            Ok(())
        })
    }
}
