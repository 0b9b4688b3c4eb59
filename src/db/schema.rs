table! {
    topics (slug) {
        slug -> Varchar,
        description -> Varchar,
    }
}

table! {
    users (username) {
        username -> Varchar,
        name -> Varchar,
        avatar_url -> Varchar,
    }
}

table! {
    articles (article_id) {
        article_id -> Int4,
        title -> Varchar,
        topic -> Varchar,
        author -> Varchar,
        body -> Varchar,
        created_at -> Timestamptz,
        votes -> Int4,
        article_img_url -> Varchar,
    }
}

table! {
    comments (comment_id) {
        comment_id -> Int4,
        body -> Varchar,
        article_id -> Int4,
        author -> Varchar,
        votes -> Int4,
        created_at -> Timestamptz,
    }
}

joinable!(articles -> topics (topic));
joinable!(articles -> users (author));
joinable!(comments -> articles (article_id));
joinable!(comments -> users (author));

allow_tables_to_appear_in_same_query!(topics, users, articles, comments);
