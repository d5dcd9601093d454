use nom::{alt, char, delimited, opt, preceded, tag, take_while, take_while1, tuple, IResult};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Statement {
    SignIn(i32),
    Search(String),
    Genre(String),
    GoToPage(usize),
    Open(i32),
    AddBook {
        title: String,
        author: String,
        genre: String,
        year: i16,
        description: Option<String>,
    },
    EditBook {
        title: String,
        author: String,
        genre: String,
        year: i16,
        description: Option<String>,
    },
    Review(i16, String),
}

#[inline(always)]
fn text(c: char) -> bool {
    c != ',' && c != ')'
}

fn parse_text(input: &str) -> IResult<&str, &str> {
    take_while1!(input, text)
}

fn parse_number(input: &str) -> IResult<&str, &str> {
    take_while1!(input, |c: char| c.is_ascii_digit())
}

fn parse_separator(input: &str) -> IResult<&str, &str> {
    delimited!(
        input,
        take_while!(|c: char| c == ' '),
        tag!(","),
        take_while!(|c: char| c == ' ')
    )
}

fn parse_statement(input: &str) -> IResult<&str, Statement> {
    let (input, statement_type) = alt! {
        input,
        tag!("signin")    |
        tag!("search")    |
        tag!("genre")     |
        tag!("page")      |
        tag!("open")      |
        tag!("add_book")  |
        tag!("edit_book") |
        tag!("review")
    }?;

    let (input, statement) = match statement_type {
        "signin" => {
            let (input, user) = delimited!(input, char!('('), parse_number, char!(')'))?;
            (
                input,
                Statement::SignIn(user.parse().expect("Parsing a number should not fail")),
            )
        }

        "search" => {
            let (input, term) = delimited!(input, char!('('), parse_text, char!(')'))?;
            (input, Statement::Search(term.trim().to_owned()))
        }

        "genre" => {
            let (input, genre) = delimited!(input, char!('('), parse_text, char!(')'))?;
            (input, Statement::Genre(genre.trim().to_owned()))
        }

        "page" => {
            let (input, number) = delimited!(input, char!('('), parse_number, char!(')'))?;
            (
                input,
                Statement::GoToPage(number.parse().expect("Parsing a number should not fail")),
            )
        }

        "open" => {
            let (input, id) = delimited!(input, char!('('), parse_number, char!(')'))?;
            (
                input,
                Statement::Open(id.parse().expect("Parsing a number should not fail")),
            )
        }

        kind @ "add_book" | kind @ "edit_book" => {
            let (input, (title, _, author, _, genre, _, year, description)) = delimited!(
                input,
                char!('('),
                tuple!(
                    parse_text,
                    parse_separator,
                    parse_text,
                    parse_separator,
                    parse_text,
                    parse_separator,
                    parse_number,
                    opt!(preceded!(parse_separator, parse_text))
                ),
                char!(')')
            )?;

            let title = title.trim().to_owned();
            let author = author.trim().to_owned();
            let genre = genre.trim().to_owned();
            let year = year.parse().expect("Parsing a number should not fail");
            let description = description.map(|text| text.trim().to_owned());

            let statement = if kind == "add_book" {
                Statement::AddBook {
                    title,
                    author,
                    genre,
                    year,
                    description,
                }
            } else {
                Statement::EditBook {
                    title,
                    author,
                    genre,
                    year,
                    description,
                }
            };

            (input, statement)
        }

        "review" => {
            let (input, (rating, _, text)) = delimited!(
                input,
                char!('('),
                tuple!(parse_number, parse_separator, parse_text),
                char!(')')
            )?;

            (
                input,
                Statement::Review(
                    rating.parse().expect("Parsing a number should not fail"),
                    text.trim().to_owned(),
                ),
            )
        }

        _ => unreachable!(),
    };

    Ok((input, statement))
}

pub fn parse_line(input: &str) -> Option<Statement> {
    let input = input.trim();
    let (rest, statement) = parse_statement(input).ok()?;

    if rest.is_empty() {
        Some(statement)
    } else {
        None
    }
}
