//! User model and signup/profile validation.

use libris_forms::validation::{
    check, CharClass, ContainsValidator, EmailValidator, MinLengthValidator, RequiredValidator,
};
use libris_forms::{FormData, ValidationErrors};
use sqlx::{FromRow, Row, SqlitePool};
use tracing::{debug, info};

use crate::error::{AuthError, Result};
use crate::password::{hash_password, verify_password};

/// What a user may do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    /// Browses the catalog and borrows books.
    #[default]
    Reader,
    /// Manages authors and books and sees every reader's loans.
    Librarian,
}

impl Role {
    /// Returns the stored name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Librarian => "librarian",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = AuthError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "reader" => Ok(Self::Reader),
            "librarian" => Ok(Self::Librarian),
            _ => Err(AuthError::UnknownRole(value)),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Primary key, `0` until saved.
    pub user_id: i64,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Login e-mail, unique.
    pub email: String,
    password_hash: String,
    /// Role of the account.
    #[sqlx(try_from = "String")]
    pub role: Role,
}

impl User {
    /// Creates a new reader. The password is hashed immediately.
    pub fn create(name: &str, surname: &str, email: &str, password: &str) -> Result<Self> {
        Ok(Self {
            user_id: 0,
            name: name.to_string(),
            surname: surname.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            role: Role::Reader,
        })
    }

    /// Creates a new librarian.
    pub fn create_librarian(name: &str, surname: &str, email: &str, password: &str) -> Result<Self> {
        let mut user = Self::create(name, surname, email, password)?;
        user.role = Role::Librarian;
        Ok(user)
    }

    /// Checks if the given password matches this user's password.
    #[must_use]
    pub fn check_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash)
    }

    /// Sets a new password. The password is hashed immediately.
    pub fn set_password(&mut self, password: &str) -> Result<()> {
        self.password_hash = hash_password(password)?;
        Ok(())
    }

    /// Returns whether this user is a librarian.
    #[must_use]
    pub fn is_librarian(&self) -> bool {
        self.role == Role::Librarian
    }

    /// Returns "name surname".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Inserts or updates the user.
    pub async fn save(&mut self, pool: &SqlitePool) -> Result<()> {
        if self.user_id == 0 {
            let result = sqlx::query(
                r#"
                INSERT INTO users (name, surname, email, password_hash, role)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&self.name)
            .bind(&self.surname)
            .bind(&self.email)
            .bind(&self.password_hash)
            .bind(self.role.as_str())
            .execute(pool)
            .await?;

            self.user_id = result.last_insert_rowid();
            info!(user_id = self.user_id, role = %self.role, "user registered");
        } else {
            sqlx::query(
                r#"
                UPDATE users
                SET name = ?, surname = ?, email = ?, password_hash = ?, role = ?
                WHERE user_id = ?
                "#,
            )
            .bind(&self.name)
            .bind(&self.surname)
            .bind(&self.email)
            .bind(&self.password_hash)
            .bind(self.role.as_str())
            .bind(self.user_id)
            .execute(pool)
            .await?;
        }

        Ok(())
    }

    /// Applies a validated profile form and saves the user.
    ///
    /// Returns `false` and leaves the user untouched when the form has
    /// errors; they are kept in `form.errors`.
    pub async fn update_profile(&mut self, pool: &SqlitePool, form: &mut UserForm) -> Result<bool> {
        form.user_id = Some(self.user_id);
        form.validate(pool).await?;
        if !form.errors.is_empty() {
            return Ok(false);
        }

        self.name.clone_from(&form.name);
        self.surname.clone_from(&form.surname);
        self.email.clone_from(&form.email);
        if let Some(password) = &form.password {
            self.set_password(password)?;
        }
        self.save(pool).await?;
        Ok(true)
    }

    /// Deletes the user. Their sessions and loans go with them.
    pub async fn delete(&self, pool: &SqlitePool) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(self.user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Finds a user by ID.
    pub async fn find_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Finds a user by ID, failing with [`AuthError::UserNotFound`].
    pub async fn get(pool: &SqlitePool, user_id: i64) -> Result<Self> {
        Self::find_by_id(pool, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Finds a user by e-mail.
    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Returns whether any user is registered with this e-mail.
    pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool> {
        Ok(Self::find_by_email(pool, email).await?.is_some())
    }

    /// Returns whether a user other than `user_id` has this e-mail.
    pub async fn is_email_taken(pool: &SqlitePool, email: &str, user_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) FROM users WHERE email = ? AND user_id != ?")
            .bind(email)
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(row.get::<i64, _>(0) > 0)
    }

    /// Returns the user with these credentials, if any.
    pub async fn authenticate(pool: &SqlitePool, email: &str, password: &str) -> Result<Option<Self>> {
        let user = Self::find_by_email(pool, email)
            .await?
            .filter(|user| user.check_password(password));
        debug!(email, success = user.is_some(), "authentication attempt");
        Ok(user)
    }

    /// Returns every reader, ordered by surname.
    pub async fn all_readers(pool: &SqlitePool) -> Result<Vec<Self>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = 'reader' ORDER BY surname, name",
        )
        .fetch_all(pool)
        .await?;
        Ok(users)
    }

    /// Returns the count of all users.
    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;
        Ok(row.get(0))
    }
}

/// Submitted signup or profile data, with the errors found in it.
#[derive(Debug, Clone, Default)]
pub struct UserForm {
    /// The user being edited, `None` for a signup.
    pub user_id: Option<i64>,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// E-mail.
    pub email: String,
    /// New password; `None` keeps the current one.
    pub password: Option<String>,
    /// Password repeated.
    pub password_confirmation: String,
    /// Problems found by [`UserForm::validate`].
    pub errors: ValidationErrors,
}

impl UserForm {
    /// Reads a signup form. The password is always checked.
    #[must_use]
    pub fn signup(data: &FormData) -> Self {
        Self {
            user_id: None,
            name: data.get("name").to_string(),
            surname: data.get("surname").to_string(),
            email: data.get("email").to_string(),
            password: Some(data.get("password").to_string()),
            password_confirmation: data.get("password_confirmation").to_string(),
            errors: ValidationErrors::new(),
        }
    }

    /// Reads a profile form for `user`. A blank e-mail or password keeps the
    /// current value.
    #[must_use]
    pub fn profile(user: &User, data: &FormData) -> Self {
        Self {
            user_id: Some(user.user_id),
            name: data.get("name").to_string(),
            surname: data.get("surname").to_string(),
            email: data
                .optional("email")
                .unwrap_or(user.email.as_str())
                .to_string(),
            password: data.optional("password").map(str::to_string),
            password_confirmation: data.get("password_confirmation").to_string(),
            errors: ValidationErrors::new(),
        }
    }

    /// Validates the form, replacing `errors`.
    pub async fn validate(&mut self, pool: &SqlitePool) -> Result<()> {
        let mut errors = ValidationErrors::new();

        check(
            &mut errors,
            "name",
            &self.name,
            &[&RequiredValidator::with_message("Name is required")],
        );
        check(
            &mut errors,
            "surname",
            &self.surname,
            &[&RequiredValidator::with_message("Surname is required")],
        );
        check(&mut errors, "email", &self.email, &[&EmailValidator::new()]);

        match self.user_id {
            Some(user_id) => {
                if User::is_email_taken(pool, &self.email, user_id).await? {
                    errors.add("email", "User with the same email is already registered");
                }
            }
            None => {
                if User::email_exists(pool, &self.email).await? {
                    errors.add("email", "Email already taken");
                }
            }
        }

        if let Some(password) = &self.password {
            if *password != self.password_confirmation {
                errors.add("password", "Password must match confirmation");
            }
            check(
                &mut errors,
                "password",
                password,
                &[
                    &MinLengthValidator::with_message(
                        6,
                        "Please enter at least 6 characters for the password",
                    ),
                    &ContainsValidator::new(CharClass::Letter, "Password needs at least one letter"),
                    &ContainsValidator::new(CharClass::Digit, "Password needs at least one number"),
                ],
            );
        }

        self.errors = errors;
        Ok(())
    }

    /// Validates the form and registers a new reader from it.
    ///
    /// Returns `None` when validation failed; the errors stay in the form.
    pub async fn save(&mut self, pool: &SqlitePool) -> Result<Option<User>> {
        self.validate(pool).await?;
        if !self.errors.is_empty() {
            return Ok(None);
        }

        let password = self.password.as_deref().unwrap_or_default();
        let mut user = User::create(&self.name, &self.surname, &self.email, password)?;
        user.save(pool).await?;
        Ok(Some(user))
    }
}

/// SQL to create the users table.
pub const CREATE_USER_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(100) NOT NULL,
    surname VARCHAR(100) NOT NULL,
    email VARCHAR(254) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role VARCHAR(16) NOT NULL DEFAULT 'reader'
)
"#;

/// Creates the users table if it doesn't exist.
pub async fn create_user_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_USER_TABLE_SQL).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        create_user_table(&pool).await.unwrap();
        pool
    }

    fn signup(fields: &[(&str, &str)]) -> UserForm {
        let data: FormData = fields.iter().copied().collect();
        UserForm::signup(&data)
    }

    fn valid_signup() -> UserForm {
        signup(&[
            ("name", "Ada"),
            ("surname", "Lovelace"),
            ("email", "ada@example.com"),
            ("password", "engine1"),
            ("password_confirmation", "engine1"),
        ])
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::try_from("librarian".to_string()).unwrap(), Role::Librarian);
        assert!(Role::try_from("admin".to_string()).is_err());
        assert_eq!(Role::default().as_str(), "reader");
    }

    #[test]
    fn test_create_user() {
        let user = User::create("Ada", "Lovelace", "ada@example.com", "engine1").unwrap();
        assert_eq!(user.role, Role::Reader);
        assert!(user.check_password("engine1"));
        assert!(!user.check_password("engine2"));

        let librarian =
            User::create_librarian("Melvil", "Dewey", "dewey@example.com", "decimal1").unwrap();
        assert!(librarian.is_librarian());
    }

    #[tokio::test]
    async fn test_signup_saves_reader() {
        let pool = create_test_pool().await;
        let mut form = valid_signup();

        let user = form.save(&pool).await.unwrap().unwrap();
        assert!(user.user_id > 0);
        assert!(form.errors.is_empty());

        let found = User::find_by_email(&pool, "ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user_id, user.user_id);
        assert_eq!(found.role, Role::Reader);
    }

    #[tokio::test]
    async fn test_signup_validation_messages() {
        let pool = create_test_pool().await;
        let mut form = signup(&[
            ("email", "not-an-email"),
            ("password", "abc"),
            ("password_confirmation", "abd"),
        ]);

        assert!(form.save(&pool).await.unwrap().is_none());
        assert_eq!(
            form.errors.messages(),
            [
                "Name is required",
                "Surname is required",
                "Invalid email",
                "Password must match confirmation",
                "Please enter at least 6 characters for the password",
                "Password needs at least one number",
            ]
        );
        assert_eq!(User::count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_password_needs_a_letter() {
        let pool = create_test_pool().await;
        let mut form = valid_signup();
        form.password = Some("123456".to_string());
        form.password_confirmation = "123456".to_string();

        form.validate(&pool).await.unwrap();
        assert_eq!(form.errors.messages(), ["Password needs at least one letter"]);
    }

    #[tokio::test]
    async fn test_email_uniqueness() {
        let pool = create_test_pool().await;
        let user = valid_signup().save(&pool).await.unwrap().unwrap();

        let mut again = valid_signup();
        again.validate(&pool).await.unwrap();
        assert_eq!(again.errors.get("email"), ["Email already taken"]);

        assert!(User::email_exists(&pool, "ada@example.com").await.unwrap());
        assert!(!User::is_email_taken(&pool, "ada@example.com", user.user_id)
            .await
            .unwrap());
        assert!(User::is_email_taken(&pool, "ada@example.com", user.user_id + 1)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_authenticate() {
        let pool = create_test_pool().await;
        valid_signup().save(&pool).await.unwrap();

        assert!(User::authenticate(&pool, "ada@example.com", "engine1")
            .await
            .unwrap()
            .is_some());
        assert!(User::authenticate(&pool, "ada@example.com", "engine2")
            .await
            .unwrap()
            .is_none());
        assert!(User::authenticate(&pool, "nobody@example.com", "engine1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_profile_keeps_blank_fields() {
        let pool = create_test_pool().await;
        let mut user = valid_signup().save(&pool).await.unwrap().unwrap();

        let data: FormData = [("name", "Augusta Ada"), ("surname", "King"), ("email", "")]
            .into_iter()
            .collect();
        let mut form = UserForm::profile(&user, &data);
        assert!(user.update_profile(&pool, &mut form).await.unwrap());

        let stored = User::get(&pool, user.user_id).await.unwrap();
        assert_eq!(stored.full_name(), "Augusta Ada King");
        assert_eq!(stored.email, "ada@example.com");
        assert!(stored.check_password("engine1"));
    }

    #[tokio::test]
    async fn test_update_profile_rejects_taken_email() {
        let pool = create_test_pool().await;
        let mut ada = valid_signup().save(&pool).await.unwrap().unwrap();
        let mut other = valid_signup();
        other.email = "grace@example.com".to_string();
        other.save(&pool).await.unwrap().unwrap();

        let data: FormData = [
            ("name", "Ada"),
            ("surname", "Lovelace"),
            ("email", "grace@example.com"),
        ]
        .into_iter()
        .collect();
        let mut form = UserForm::profile(&ada, &data);

        assert!(!ada.update_profile(&pool, &mut form).await.unwrap());
        assert_eq!(
            form.errors.messages(),
            ["User with the same email is already registered"]
        );
        assert_eq!(ada.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_all_readers_and_delete() {
        let pool = create_test_pool().await;
        let reader = valid_signup().save(&pool).await.unwrap().unwrap();
        let mut librarian =
            User::create_librarian("Melvil", "Dewey", "dewey@example.com", "decimal1").unwrap();
        librarian.save(&pool).await.unwrap();

        let readers = User::all_readers(&pool).await.unwrap();
        assert_eq!(readers.len(), 1);
        assert_eq!(readers[0].user_id, reader.user_id);

        reader.delete(&pool).await.unwrap();
        assert!(User::find_by_id(&pool, reader.user_id).await.unwrap().is_none());
        assert!(matches!(
            User::get(&pool, reader.user_id).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
