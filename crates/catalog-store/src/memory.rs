//! In-process implementation of the catalog repository.
//!
//! All state sits behind one async mutex, so every call observes and
//! mutates a consistent snapshot and each mutation is atomic. The same
//! constraint errors as the PostgreSQL backend are raised.

use std::collections::BTreeMap;

use async_trait::async_trait;
use catalog_core::{
    Author, AuthorFilter, AuthorId, AuthorWithBooks, Book, BookFilter, BookId, BookWithAuthor,
    NewAuthor, NewBook, normalize_email,
};
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::repository::CatalogRepository;

#[derive(Debug)]
struct MemoryState {
    authors: BTreeMap<AuthorId, Author>,
    books: BTreeMap<BookId, Book>,
    next_author_id: i32,
    next_book_id: i32,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            authors: BTreeMap::new(),
            books: BTreeMap::new(),
            next_author_id: 1,
            next_book_id: 1,
        }
    }
}

impl MemoryState {
    fn author_view(&self, author: &Author) -> AuthorWithBooks {
        AuthorWithBooks {
            author: author.clone(),
            books: self
                .books
                .values()
                .filter(|book| book.author_id == author.id)
                .cloned()
                .collect(),
        }
    }

    fn book_view(&self, book: &Book) -> StoreResult<BookWithAuthor> {
        let author = self
            .authors
            .get(&book.author_id)
            .ok_or(StoreError::UnknownAuthor(book.author_id))?;

        Ok(BookWithAuthor {
            book: book.clone(),
            author: author.clone(),
        })
    }

    fn email_owner(&self, email: &str) -> Option<&Author> {
        let email = normalize_email(email);
        self.authors
            .values()
            .find(|author| normalize_email(&author.email) == email)
    }

    fn check_author_ref(&self, author_id: AuthorId) -> StoreResult<()> {
        if self.authors.contains_key(&author_id) {
            Ok(())
        } else {
            Err(StoreError::UnknownAuthor(author_id))
        }
    }

    fn put_author(&mut self, id: AuthorId, name: &str, email: &str) {
        self.authors.insert(
            id,
            Author {
                id,
                name: name.to_string(),
                email: email.to_string(),
            },
        );
        self.next_author_id = self.next_author_id.max(id.get() + 1);
    }

    fn put_book(&mut self, id: BookId, title: &str, isbn: &str, year: i32, author_id: AuthorId) {
        self.books.insert(
            id,
            Book {
                id,
                title: title.to_string(),
                isbn: isbn.to_string(),
                publication_year: year,
                author_id,
            },
        );
        self.next_book_id = self.next_book_id.max(id.get() + 1);
    }
}

/// Catalog repository held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    state: Mutex<MemoryState>,
}

impl MemoryCatalogStore {
    /// An empty store; the first ids assigned are 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the same sample data as the first-run seed
    /// migration.
    pub fn seeded() -> Self {
        let mut state = MemoryState::default();
        state.put_author(AuthorId(1), "J.K. Rowling", "jk.rowling@example.com");
        state.put_author(AuthorId(2), "Stephen King", "stephen.king@example.com");
        state.put_book(BookId(1), "Harry Potter", "1234567890", 1997, AuthorId(1));
        state.put_book(BookId(2), "The Shining", "0987654321", 1977, AuthorId(2));

        Self {
            state: Mutex::new(state),
        }
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalogStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get_author(&self, id: AuthorId) -> StoreResult<AuthorWithBooks> {
        let state = self.state.lock().await;
        state
            .authors
            .get(&id)
            .map(|author| state.author_view(author))
            .ok_or(StoreError::AuthorNotFound(id))
    }

    async fn author_exists(&self, id: AuthorId) -> StoreResult<bool> {
        Ok(self.state.lock().await.authors.contains_key(&id))
    }

    async fn find_author_by_email(&self, email: &str) -> StoreResult<Option<Author>> {
        Ok(self.state.lock().await.email_owner(email).cloned())
    }

    async fn search_authors(&self, filter: &AuthorFilter) -> StoreResult<Vec<AuthorWithBooks>> {
        let state = self.state.lock().await;
        Ok(state
            .authors
            .values()
            .filter(|author| filter.matches(author))
            .map(|author| state.author_view(author))
            .collect())
    }

    async fn insert_author(&self, author: &NewAuthor) -> StoreResult<Author> {
        let mut state = self.state.lock().await;

        if state.email_owner(&author.email).is_some() {
            return Err(StoreError::DuplicateEmail(author.email.clone()));
        }

        let id = AuthorId(state.next_author_id);
        state.put_author(id, &author.name, &author.email);
        Ok(state.authors[&id].clone())
    }

    async fn update_author(&self, id: AuthorId, author: &NewAuthor) -> StoreResult<Author> {
        let mut state = self.state.lock().await;

        if !state.authors.contains_key(&id) {
            return Err(StoreError::AuthorNotFound(id));
        }

        if state
            .email_owner(&author.email)
            .is_some_and(|owner| owner.id != id)
        {
            return Err(StoreError::DuplicateEmail(author.email.clone()));
        }

        state.put_author(id, &author.name, &author.email);
        Ok(state.authors[&id].clone())
    }

    async fn delete_author(&self, id: AuthorId) -> StoreResult<()> {
        let mut state = self.state.lock().await;

        if !state.authors.contains_key(&id) {
            return Err(StoreError::AuthorNotFound(id));
        }

        if state.books.values().any(|book| book.author_id == id) {
            return Err(StoreError::AuthorHasBooks(id));
        }

        state.authors.remove(&id);
        Ok(())
    }

    async fn get_book(&self, id: BookId) -> StoreResult<BookWithAuthor> {
        let state = self.state.lock().await;
        let book = state.books.get(&id).ok_or(StoreError::BookNotFound(id))?;
        state.book_view(book)
    }

    async fn search_books(&self, filter: &BookFilter) -> StoreResult<Vec<BookWithAuthor>> {
        let state = self.state.lock().await;
        state
            .books
            .values()
            .filter(|book| filter.matches(book))
            .map(|book| state.book_view(book))
            .collect()
    }

    async fn insert_book(&self, book: &NewBook) -> StoreResult<BookWithAuthor> {
        let mut state = self.state.lock().await;
        state.check_author_ref(book.author_id)?;

        let id = BookId(state.next_book_id);
        state.put_book(
            id,
            &book.title,
            &book.isbn,
            book.publication_year,
            book.author_id,
        );
        state.book_view(&state.books[&id])
    }

    async fn update_book(&self, id: BookId, book: &NewBook) -> StoreResult<Book> {
        let mut state = self.state.lock().await;

        if !state.books.contains_key(&id) {
            return Err(StoreError::BookNotFound(id));
        }
        state.check_author_ref(book.author_id)?;

        state.put_book(
            id,
            &book.title,
            &book.isbn,
            book.publication_year,
            book.author_id,
        );
        Ok(state.books[&id].clone())
    }

    async fn delete_book(&self, id: BookId) -> StoreResult<()> {
        self.state
            .lock()
            .await
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::BookNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> NewAuthor {
        NewAuthor::new("Ada Lovelace", "ada@example.com").unwrap()
    }

    fn notes(author_id: AuthorId) -> NewBook {
        NewBook::new("Notes", "111", 1843, author_id).unwrap()
    }

    #[tokio::test]
    async fn seeded_store_lists_sample_data_with_relations() {
        let store = MemoryCatalogStore::seeded();

        let authors = store.list_authors().await.unwrap();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].author.name, "J.K. Rowling");
        assert_eq!(authors[0].books[0].title, "Harry Potter");

        let books = store.list_books().await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[1].author.name, "Stephen King");
    }

    #[tokio::test]
    async fn insert_after_seed_continues_ids() {
        let store = MemoryCatalogStore::seeded();
        let author = store.insert_author(&ada()).await.unwrap();
        assert_eq!(author.id, AuthorId(3));

        let book = store.insert_book(&notes(author.id)).await.unwrap();
        assert_eq!(book.book.id, BookId(3));
        assert_eq!(book.author, author);
    }

    #[tokio::test]
    async fn round_trip_author_by_id() {
        let store = MemoryCatalogStore::new();
        let created = store.insert_author(&ada()).await.unwrap();
        assert_eq!(created.id, AuthorId(1));

        let fetched = store.get_author(created.id).await.unwrap();
        assert_eq!(fetched.author, created);
        assert!(fetched.books.is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let store = MemoryCatalogStore::new();
        store.insert_author(&ada()).await.unwrap();

        let shouting = NewAuthor {
            name: "Someone Else".to_string(),
            email: "ADA@example.com".to_string(),
        };
        let err = store.insert_author(&shouting).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));

        let found = store.find_author_by_email(" Ada@Example.com ").await.unwrap();
        assert_eq!(found.map(|a| a.id), Some(AuthorId(1)));
    }

    #[tokio::test]
    async fn update_author_keeps_own_email_and_rejects_foreign_one() {
        let store = MemoryCatalogStore::seeded();
        let renamed = NewAuthor::new("Joanne Rowling", "jk.rowling@example.com").unwrap();
        let updated = store.update_author(AuthorId(1), &renamed).await.unwrap();
        assert_eq!(updated.name, "Joanne Rowling");

        let stolen = NewAuthor::new("Joanne Rowling", "stephen.king@example.com").unwrap();
        let err = store.update_author(AuthorId(1), &stolen).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));

        let err = store.update_author(AuthorId(99), &renamed).await.unwrap_err();
        assert!(matches!(err, StoreError::AuthorNotFound(AuthorId(99))));
    }

    #[tokio::test]
    async fn delete_author_is_guarded_by_books() {
        let store = MemoryCatalogStore::seeded();

        let err = store.delete_author(AuthorId(2)).await.unwrap_err();
        assert!(matches!(err, StoreError::AuthorHasBooks(AuthorId(2))));

        store.delete_book(BookId(2)).await.unwrap();
        store.delete_author(AuthorId(2)).await.unwrap();
        assert!(!store.author_exists(AuthorId(2)).await.unwrap());

        let err = store.delete_author(AuthorId(2)).await.unwrap_err();
        assert!(matches!(err, StoreError::AuthorNotFound(_)));
    }

    #[tokio::test]
    async fn book_writes_require_existing_author() {
        let store = MemoryCatalogStore::seeded();

        let err = store.insert_book(&notes(AuthorId(42))).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownAuthor(AuthorId(42))));
        assert_eq!(store.list_books().await.unwrap().len(), 2);

        let err = store
            .update_book(BookId(1), &notes(AuthorId(42)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownAuthor(_)));

        let err = store
            .update_book(BookId(77), &notes(AuthorId(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::BookNotFound(BookId(77))));
    }

    #[tokio::test]
    async fn update_book_moves_it_between_authors() {
        let store = MemoryCatalogStore::seeded();
        store
            .update_book(BookId(1), &notes(AuthorId(2)))
            .await
            .unwrap();

        assert!(store.get_author(AuthorId(1)).await.unwrap().books.is_empty());
        assert_eq!(store.get_author(AuthorId(2)).await.unwrap().books.len(), 2);
    }

    #[tokio::test]
    async fn search_combines_filters() {
        let store = MemoryCatalogStore::seeded();

        let all = store.search_books(&BookFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let filter = BookFilter {
            title: Some("the".to_string()),
            publication_year: Some(1977),
            ..BookFilter::default()
        };
        let hits = store.search_books(&filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].book.title, "The Shining");

        let none = AuthorFilter {
            name: Some("tolkien".to_string()),
            ..AuthorFilter::default()
        };
        assert!(store.search_authors(&none).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_book_is_not_found() {
        let store = MemoryCatalogStore::new();
        let err = store.delete_book(BookId(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::BookNotFound(BookId(1))));
    }
}
