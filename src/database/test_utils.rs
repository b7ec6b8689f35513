use diesel::sqlite::SqliteConnection;

use super::db_utils::establish_in_memory;
use super::models::{
    article::{Article, ArticleType, NewArticle},
    blog::{Blog, NewBlog},
    comment::{Comment, NewComment},
    user::{NewUser, User},
};

pub fn conn() -> SqliteConnection {
    establish_in_memory().expect("in-memory database")
}

pub fn new_user<'a>(username: &'a str, email: &'a str) -> NewUser<'a> {
    NewUser {
        username,
        password: "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8",
        nickname: username,
        email,
        avatar: "avatars/default.png",
    }
}

pub fn create_user(conn: &SqliteConnection, username: &str) -> User {
    let email = format!("{}@example.com", username);
    User::new(conn, &new_user(username, &email)).expect("create user")
}

/// Opens a blog whose site slug is the owner's username.
pub fn create_blog(conn: &SqliteConnection, owner: &User) -> Blog {
    Blog::new(
        conn,
        &NewBlog {
            title: "Notes",
            site: &owner.username,
            theme: "light",
            user_id: owner.id,
        },
    )
    .expect("create blog")
}

pub fn create_article(conn: &SqliteConnection, blog: &Blog, category_id: Option<i32>) -> Article {
    Article::new(
        conn,
        &NewArticle {
            title: "Hello",
            summary: "First post",
            blog_id: blog.id,
            category_id,
            article_type: ArticleType::Python,
        },
    )
    .expect("create article")
}

pub fn create_comment(conn: &SqliteConnection, article: &Article, author: &User, reply_id: Option<i64>) -> Comment {
    Comment::new(
        conn,
        &NewComment {
            content: "Nice post",
            article_id: article.id,
            user_id: author.id,
            reply_id,
        },
    )
    .expect("create comment")
}
