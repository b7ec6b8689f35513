pub mod article;
pub mod article_detail;
pub mod article_tag;
pub mod blog;
pub mod category;
pub mod comment;
pub mod tag;
pub mod up_down;
pub mod user;
pub mod user_fans;

pub use article::{Article, ArticleChanges, ArticleType, NewArticle};
pub use article_detail::ArticleDetail;
pub use article_tag::Article2Tag;
pub use blog::{Blog, BlogChanges, NewBlog};
pub use category::Category;
pub use comment::{Comment, NewComment};
pub use tag::Tag;
pub use up_down::UpDown;
pub use user::{NewUser, User, UserChanges};
pub use user_fans::UserFans;
