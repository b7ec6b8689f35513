table! {
    users (id) {
        id -> BigInt,
        username -> Text,
        password -> Text,
        nickname -> Text,
        email -> Text,
        avatar -> Text,
        create_time -> Timestamp,
    }
}

table! {
    user_fans (id) {
        id -> BigInt,
        user_id -> BigInt,
        follower_id -> BigInt,
    }
}

table! {
    blogs (id) {
        id -> BigInt,
        title -> Text,
        site -> Text,
        theme -> Text,
        user_id -> BigInt,
    }
}

table! {
    categories (id) {
        id -> Integer,
        category_title -> Text,
        blog_id -> BigInt,
    }
}

table! {
    tags (id) {
        id -> Integer,
        title -> Text,
        blog_id -> BigInt,
    }
}

table! {
    articles (id) {
        id -> BigInt,
        title -> Text,
        summary -> Text,
        read_count -> Integer,
        comment_count -> Integer,
        up_count -> Integer,
        down_count -> Integer,
        create_time -> Timestamp,
        blog_id -> BigInt,
        category_id -> Nullable<Integer>,
        article_type_id -> Integer,
    }
}

table! {
    article_details (id) {
        id -> BigInt,
        content -> Text,
        article_id -> BigInt,
    }
}

table! {
    article_tags (id) {
        id -> BigInt,
        article_id -> BigInt,
        tag_id -> Integer,
    }
}

table! {
    up_downs (id) {
        id -> BigInt,
        article_id -> BigInt,
        user_id -> BigInt,
        up -> Bool,
    }
}

table! {
    comments (id) {
        id -> BigInt,
        content -> Text,
        create_time -> Timestamp,
        reply_id -> Nullable<BigInt>,
        article_id -> BigInt,
        user_id -> BigInt,
    }
}

joinable!(blogs -> users (user_id));
joinable!(categories -> blogs (blog_id));
joinable!(tags -> blogs (blog_id));
joinable!(articles -> blogs (blog_id));
joinable!(articles -> categories (category_id));
joinable!(article_details -> articles (article_id));
joinable!(article_tags -> articles (article_id));
joinable!(article_tags -> tags (tag_id));
joinable!(up_downs -> articles (article_id));
joinable!(up_downs -> users (user_id));
joinable!(comments -> articles (article_id));
joinable!(comments -> users (user_id));

allow_tables_to_appear_in_same_query!(
    users,
    user_fans,
    blogs,
    categories,
    tags,
    articles,
    article_details,
    article_tags,
    up_downs,
    comments,
);
