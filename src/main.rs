pub mod parser;

use anyhow::Error;
use catalog::{BookPatch, Catalog, Entity, GenreFilter, NewBook, Session, ToTable};
use clap::{App, Arg};
use config::Config;
use pages::{BookPage, Directory, ProfilePage, ReviewSession, ViewState};
use parser::Statement;
use postgres_store::PgCatalog;
use simplelog::{LevelFilter, TermLogger, TerminalMode};

macro_rules! prompt {
    ($ed:ident) => {{
        prompt!($ed, "")
    }};

    ($ed:ident, $ctx:expr) => {{
        use rustyline::error::ReadlineError;

        let msg = if $ctx.is_empty() {
            format!("{}", PROMPT)
        } else {
            format!("({}) {}", $ctx, PROMPT)
        };

        match $ed.readline(&msg) {
            Ok(line) => {
                $ed.add_history_entry(line.as_str());
                Ok(line)
            }

            Err(ReadlineError::Interrupted) => {
                continue;
            }

            Err(ReadlineError::Eof) => {
                if $ctx.is_empty() {
                    println!("Exiting...Good bye!");
                } else {
                    println!("Closing {}", $ctx);
                }

                break;
            }

            Err(e) => Err(e),
        }
    }};
}

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = ">> ";

fn confirm(rl: &mut rustyline::Editor<()>, what: &str) -> Result<bool, Error> {
    let answer = rl.readline(&format!("Permanently delete this {}? [y/N] ", what))?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn show_directory<C: Catalog>(directory: &mut Directory<C>) {
    if let Some(notice) = directory.take_notice() {
        println!("{}", notice);
    }

    match directory.state() {
        ViewState::Loading => println!("Loading..."),
        ViewState::Failed => println!("Failed to fetch books"),
        ViewState::Loaded(page) => {
            if page.cards.is_empty() {
                println!("No books found");
                return;
            }

            for card in &page.cards {
                println!("{}", card.book.to_table());
                if let Some(badge) = card.badge() {
                    println!("Rating: {}", badge);
                }
            }

            println!("Page {} of {}", directory.page(), page.total_pages);
        }
    }
}

fn show_book<C: Catalog>(page: &BookPage<C>) {
    println!("{}", page.book().to_table());

    let summary = page.summary();
    let noun = if summary.count == 1 {
        "review"
    } else {
        "reviews"
    };
    println!("Rating: {:.1} ({} {})", summary.average, summary.count, noun);

    match page.review_session() {
        ReviewSession::Anonymous => println!("Sign in to write a review"),
        ReviewSession::Composing(_) => {
            println!("No review from you yet, use review(<1-5>, <text>)")
        }
        ReviewSession::Viewing(review) => {
            println!("Your review: {}/5 {}", review.rating, review.review_text)
        }
        ReviewSession::Editing { form, .. } => {
            println!("Editing your review ({}/5 {})", form.rating, form.text)
        }
    }

    if page.reviews().is_empty() {
        println!("No reviews yet. Be the first to review this book!");
        return;
    }

    println!("All reviews:");
    for entry in page.reviews() {
        println!(
            "  {} rated {}/5: {}",
            entry.author_name(),
            entry.review.rating,
            entry.review.review_text
        );
    }
}

fn show_profile<C: Catalog>(store: &C, session: &Session) {
    let page = match ProfilePage::load(store, session) {
        Ok(page) => page,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };

    println!("{}", page.profile().to_table());
    println!(
        "Books added: {}, reviews written: {}, member since {}",
        page.books_added(),
        page.reviews_written(),
        page.member_since()
    );

    for card in page.books() {
        match card.badge() {
            Some(badge) => println!("  {} - {}", card.book.title, badge),
            None => println!("  {}", card.book.title),
        }
    }

    for review in page.reviews() {
        println!(
            "  {}/5 on {} by {}",
            review.review.rating, review.book_title, review.book_author
        );
    }
}

fn book_prompt<C: Catalog>(store: &C, session: &Session, book_id: i32) -> Result<(), Error> {
    let mut page = match BookPage::open(store, session, book_id) {
        Ok(page) => page,
        Err(e) => {
            // Fatal for this view, back to the directory
            println!("{}", e);
            return Ok(());
        }
    };

    let name = format!("book {}", book_id);
    let mut rl = rustyline::Editor::<()>::new();

    show_book(&page);

    loop {
        let opt: String = prompt!(rl, name)?;

        match opt.trim() {
            "?" | "h" | "help" => {
                println!("Book help:");
                println!("h | help                 Shows this help");
                println!("show                     Show the book and its reviews");
                println!("review(<1-5>, <text>)    Submit or save your review");
                println!("edit                     Edit your review");
                println!("cancel                   Leave edit mode");
                println!("delete_review            Delete your review");
                println!("edit_book(<title>, <author>, <genre>, <year>[, <description>])");
                println!("delete_book              Delete this book (owner only)");
                println!("b | back                 Back to the directory");
            }

            "b" | "back" | "q" | "quit" => break,

            "show" => show_book(&page),

            "edit" => {
                page.edit();
                show_book(&page);
            }

            "cancel" => {
                page.cancel_edit();
                show_book(&page);
            }

            "delete_review" => {
                if confirm(&mut rl, "review")? {
                    page.delete_review();
                    match page.take_notice() {
                        Some(notice) => println!("{}", notice),
                        None => println!("Review deleted"),
                    }
                }
            }

            "delete_book" => {
                if !page.is_book_owner() {
                    println!("You can only delete your own books");
                } else if confirm(&mut rl, "book")? {
                    if page.delete_book() {
                        println!("Book deleted");
                        break;
                    } else if let Some(notice) = page.take_notice() {
                        println!("{}", notice);
                    }
                }
            }

            empty if empty.is_empty() => {}

            line => match parser::parse_line(line) {
                Some(Statement::Review(rating, text)) => {
                    page.set_rating(rating);
                    page.set_text(&text);
                    page.submit_review();

                    match page.take_notice() {
                        Some(notice) => println!("{}", notice),
                        None => println!("Review saved"),
                    }
                }

                Some(Statement::EditBook {
                    title,
                    author,
                    genre,
                    year,
                    description,
                }) => {
                    let owner = match session.require_user() {
                        Ok(owner) => owner,
                        Err(e) => {
                            println!("{}", e);
                            continue;
                        }
                    };

                    let patch = BookPatch {
                        title: Some(title),
                        author: Some(author),
                        genre: Some(genre),
                        published_year: Some(year),
                        description,
                    };

                    match store.update_book(book_id, owner, &patch) {
                        Ok(_) => {
                            println!("Book updated");

                            // Pick up the saved fields
                            match BookPage::open(store, session, book_id) {
                                Ok(reopened) => {
                                    page = reopened;
                                    show_book(&page);
                                }
                                Err(e) => {
                                    println!("{}", e);
                                    break;
                                }
                            }
                        }
                        Err(e) => println!("{}", e),
                    }
                }

                Some(_) => println!("Invalid in this context!"),
                None => println!("Invalid syntax!"),
            },
        }
    }

    Ok(())
}

fn main() -> Result<(), Error> {
    let matches = App::new("book-catalog")
        .version(VERSION)
        .about("Browse, catalogue and review books")
        .arg(
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .help("Path to the configuration file"),
        )
        .get_matches();

    TermLogger::init(
        LevelFilter::Warn,
        simplelog::Config::default(),
        TerminalMode::Mixed,
    )?;

    let config = match matches.value_of("config") {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let store = PgCatalog::from_config(&config, "catalog")?;
    let mut session = Session::anonymous();
    let mut directory = Directory::with_catalog(&store, config.directory.page_size);
    directory.refresh();

    println!("Welcome to book-catalog {}", VERSION);
    let mut rl = rustyline::Editor::<()>::new();

    loop {
        let opt: String = prompt!(rl)?;

        match opt.trim() {
            "?" | "h" | "help" => {
                println!("Main help:");
                println!("h | help                 Shows this help");
                println!("q | quit                 Quit");
                println!("signin(<user>)           Sign in with a user id");
                println!("signout                  Back to anonymous browsing");
                println!("list                     Show the current directory page");
                println!("search(<term>)           Filter by title or author");
                println!("genre(<genre>)           Filter by genre, genre(all) clears");
                println!("genres                   List the known genres");
                println!("page(<n>) | next | prev  Move through the pages");
                println!("open(<book>)             Open a book's detail view");
                println!("add_book(<title>, <author>, <genre>, <year>[, <description>])");
                println!("profile                  Show your dashboard");
            }

            "q" | "quit" => {
                println!("Bye!");
                break;
            }

            "v" | "version" => {
                println!("version: {}", VERSION);
            }

            "signout" => {
                session = Session::anonymous();
                println!("Signed out");
            }

            "list" => show_directory(&mut directory),

            "next" => {
                directory.next_page();
                show_directory(&mut directory);
            }

            "prev" => {
                directory.prev_page();
                show_directory(&mut directory);
            }

            "genres" => match directory.genres() {
                Ok(genres) => println!("Genres: {}", genres.join(", ")),
                Err(e) => println!("{}", e),
            },

            "profile" => show_profile(&store, &session),

            empty if empty.is_empty() => {}

            line => match parser::parse_line(line) {
                Some(stmt) => match stmt {
                    Statement::SignIn(user) => match store.profile(user) {
                        Ok(profile) => {
                            session = Session::signed_in(user);
                            println!("Signed in as {}", profile.name);
                        }
                        Err(e) => println!("{}", e),
                    },

                    Statement::Search(term) => {
                        directory.set_search_term(&term);
                        show_directory(&mut directory);
                    }

                    Statement::Genre(genre) => {
                        directory.set_genre(GenreFilter::from_sentinel(&genre));
                        show_directory(&mut directory);
                    }

                    Statement::GoToPage(number) => {
                        directory.go_to_page(number);
                        show_directory(&mut directory);
                    }

                    Statement::Open(book_id) => {
                        book_prompt(&store, &session, book_id)?;
                        // Whatever happened in there, the listing may be stale
                        directory.refresh();
                    }

                    Statement::AddBook {
                        title,
                        author,
                        genre,
                        year,
                        description,
                    } => {
                        let owner = match session.require_user() {
                            Ok(owner) => owner,
                            Err(e) => {
                                println!("{}", e);
                                continue;
                            }
                        };

                        let new_book = NewBook::new(
                            &title,
                            &author,
                            &genre,
                            year,
                            description.as_deref(),
                            owner,
                        );

                        match new_book {
                            Ok(new_book) => match store.add_book(&new_book) {
                                Ok(book) => {
                                    println!("Added book with id({})", book.get_id());
                                    directory.refresh();
                                }
                                Err(e) => println!("{}", e),
                            },
                            Err(e) => println!("{}", e),
                        }
                    }

                    Statement::Review(_, _) | Statement::EditBook { .. } => {
                        println!("Invalid in this context!")
                    }
                },

                None => println!("Invalid syntax!"),
            },
        }
    }

    Ok(())
}
