use crate::schema::books;
use catalog::{Book, BookPatch, NewBook};
use chrono::NaiveDateTime;

// To query data from the database
#[derive(Debug, Clone, Identifiable, Queryable)]
#[table_name = "books"]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i16,
    pub description: Option<String>,
    pub added_by: i32,
    pub created_at: NaiveDateTime,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            genre: row.genre,
            published_year: row.published_year,
            description: row.description,
            added_by: row.added_by,
            created_at: row.created_at,
        }
    }
}

// To insert a new book into the database
#[derive(Debug, Clone, Insertable)]
#[table_name = "books"]
pub struct NewBookRow<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub genre: &'a str,
    pub published_year: i16,
    pub description: Option<&'a str>,
    pub added_by: i32,
}

impl<'a> From<&'a NewBook> for NewBookRow<'a> {
    fn from(book: &'a NewBook) -> Self {
        Self {
            title: &book.title,
            author: &book.author,
            genre: &book.genre,
            published_year: book.published_year,
            description: book.description.as_deref(),
            added_by: book.added_by,
        }
    }
}

// To update a subset of a book's fields, None means untouched
#[derive(Debug, Clone, Default, AsChangeset)]
#[table_name = "books"]
pub struct BookChanges<'a> {
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub genre: Option<&'a str>,
    pub published_year: Option<i16>,
    pub description: Option<&'a str>,
}

impl<'a> From<&'a BookPatch> for BookChanges<'a> {
    fn from(patch: &'a BookPatch) -> Self {
        Self {
            title: patch.title.as_deref(),
            author: patch.author.as_deref(),
            genre: patch.genre.as_deref(),
            published_year: patch.published_year,
            description: patch.description.as_deref(),
        }
    }
}
