use super::ApiError;

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    let len = username.chars().count();
    if !(4..=15).contains(&len) {
        return Err(ApiError::validation(format!(
            "Invalid username: '{}'. Username must be 4 to 15 characters",
            username
        )));
    }

    if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(ApiError::validation(
            "Username can only contain letters, numbers, and underscores",
        ));
    }

    Ok(username)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let valid = email.len() >= 3
        && email.len() <= 320
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain
                    .rsplit_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        });

    if !valid {
        return Err(ApiError::validation(format!("Invalid email: '{}'", email)));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.len() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters",
        ));
    }
    if password.len() > 128 {
        return Err(ApiError::validation(
            "Password must be 128 characters or less",
        ));
    }
    Ok(password)
}

pub fn validate_person_name(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

pub fn validate_product_name(name: &str) -> Result<&str, ApiError> {
    if name.is_empty() {
        return Err(ApiError::validation("Product name cannot be empty"));
    }
    if name.len() > 100 {
        return Err(ApiError::validation(
            "Product name must be 100 characters or less",
        ));
    }
    Ok(name)
}

pub fn validate_price(price: f64) -> Result<f64, ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::validation(format!(
            "Invalid price: {}. Price must be non-negative",
            price
        )));
    }
    Ok(price)
}

pub fn validate_stock(stock: i32) -> Result<i32, ApiError> {
    if stock < 0 {
        return Err(ApiError::validation(format!(
            "Invalid stock: {}. Stock must be non-negative",
            stock
        )));
    }
    Ok(stock)
}

pub fn validate_quantity(quantity: i32) -> Result<i32, ApiError> {
    if quantity <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid quantity: {}. Quantity must be a positive integer",
            quantity
        )));
    }
    Ok(quantity)
}

pub fn validate_total_amount(total: f64) -> Result<f64, ApiError> {
    if !total.is_finite() || total < 0.0 {
        return Err(ApiError::validation(format!(
            "Invalid total amount: {}. Total must be non-negative",
            total
        )));
    }
    Ok(total)
}
