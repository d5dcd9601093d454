#[macro_use]
extern crate diesel;

use anyhow::Error;
use catalog::Catalog;
use diesel::pg::PgConnection;
use diesel::{insert_into, prelude::*, sql_query};
use indicatif::ProgressIterator;
use postgres_store::schema::{books, profiles, reviews};
use postgres_store::{establish_connection, PgCatalog};
use std::collections::HashMap;

#[derive(Insertable)]
#[table_name = "profiles"]
struct SeedProfile<'a> {
    user_id: i32,
    name: &'a str,
    email: &'a str,
}

#[derive(Insertable)]
#[table_name = "books"]
struct SeedBook<'a> {
    id: i32,
    title: &'a str,
    author: &'a str,
    genre: &'a str,
    published_year: i16,
    description: Option<&'a str>,
    added_by: i32,
}

#[derive(Insertable)]
#[table_name = "reviews"]
struct SeedReview<'a> {
    book_id: i32,
    user_id: i32,
    rating: i16,
    review_text: &'a str,
}

fn insert_profiles(conn: &PgConnection) -> Result<(), Error> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b';')
        .from_path("data/profiles.csv")?;

    let mut seeded = Vec::new();
    println!("Collecting records for profiles...");
    let records: Vec<_> = csv.records().collect();

    for record in records.iter().progress() {
        if let Ok(record) = record {
            let user_id: i32 = record[0].parse()?;
            let name = &record[1];
            let email = &record[2];

            seeded.push(SeedProfile {
                user_id,
                name,
                email,
            });
        }
    }

    println!("Pushing profiles by chunks");
    for chunk in seeded.chunks(10_000).progress() {
        insert_into(profiles::table).values(chunk).execute(conn)?;
    }

    Ok(())
}

fn insert_books(conn: &PgConnection) -> Result<(), Error> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b';')
        .from_path("data/books.csv")?;

    let mut seeded = Vec::new();
    println!("Collecting records for books...");
    let records: Vec<_> = csv.records().collect();

    for record in records.iter().progress() {
        if let Ok(record) = record {
            let id: i32 = record[0].parse()?;
            let title = &record[1];
            let author = &record[2];
            let genre = &record[3];
            let published_year: i16 = record[4].parse()?;
            let description = if record[5].is_empty() {
                None
            } else {
                Some(&record[5])
            };
            let added_by: i32 = record[6].parse()?;

            seeded.push(SeedBook {
                id,
                title,
                author,
                genre,
                published_year,
                description,
                added_by,
            });
        }
    }

    println!("Pushing books by chunks");
    for chunk in seeded.chunks(10_000).progress() {
        insert_into(books::table).values(chunk).execute(conn)?;
    }

    Ok(())
}

fn insert_reviews(conn: &PgConnection, url: &str) -> Result<(), Error> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b';')
        .from_path("data/reviews.csv")?;

    let mut seeded = Vec::new();
    println!("Collecting records for reviews...");
    let records: Vec<_> = csv.records().collect();

    let store = PgCatalog::with_url(url)?;
    for record in records.iter().progress() {
        if let Ok(record) = record {
            let book_id: i32 = record[0].parse()?;
            let user_id: i32 = record[1].parse()?;
            let rating: i16 = record[2].parse()?;
            let review_text = &record[3];

            // Skip reviews whose book didn't make it into the catalog
            if store.book(book_id).is_err() {
                continue;
            }

            seeded.push(SeedReview {
                book_id,
                user_id,
                rating,
                review_text,
            });
        }
    }

    println!("Pushing reviews by chunks");
    for chunk in seeded.chunks(10_000).progress() {
        insert_into(reviews::table).values(chunk).execute(conn)?;
    }

    Ok(())
}

// The seed files carry explicit ids, so the serial sequences must be moved
// past them before the application inserts anything
fn bump_sequences(conn: &PgConnection) -> Result<(), Error> {
    sql_query("SELECT setval('profiles_user_id_seq', COALESCE((SELECT MAX(user_id) FROM profiles), 1))")
        .execute(conn)?;
    sql_query("SELECT setval('books_id_seq', COALESCE((SELECT MAX(id) FROM books), 1))")
        .execute(conn)?;
    sql_query("SELECT setval('reviews_id_seq', COALESCE((SELECT MAX(id) FROM reviews), 1))")
        .execute(conn)?;

    Ok(())
}

fn main() -> Result<(), Error> {
    let vars: HashMap<String, String> = dotenv::vars().collect();

    let url = &vars["DATABASE_URL"];
    let conn = establish_connection(url)?;

    insert_profiles(&conn)?;
    insert_books(&conn)?;
    insert_reviews(&conn, url)?;
    bump_sequences(&conn)?;
    Ok(())
}
