table! {
    books (id) {
        id -> Int4,
        title -> Varchar,
        author -> Varchar,
        genre -> Varchar,
        published_year -> Int2,
        description -> Nullable<Text>,
        added_by -> Int4,
        created_at -> Timestamp,
    }
}

table! {
    profiles (user_id) {
        user_id -> Int4,
        name -> Varchar,
        email -> Varchar,
        created_at -> Timestamp,
    }
}

table! {
    reviews (id) {
        id -> Int4,
        book_id -> Int4,
        user_id -> Int4,
        rating -> Int2,
        review_text -> Text,
        created_at -> Timestamp,
    }
}

joinable!(books -> profiles (added_by));
joinable!(reviews -> books (book_id));
joinable!(reviews -> profiles (user_id));

allow_tables_to_appear_in_same_query!(
    books,
    profiles,
    reviews,
);
