//! Sample company database and example questions.

/// Tables of the sample database, in creation order.
pub const SAMPLE_TABLES_SQL: &[&str] = &[
    r"
CREATE TABLE Customers (
    CustomerID INTEGER PRIMARY KEY,
    Name TEXT NOT NULL,
    Email TEXT,
    Phone TEXT,
    JoinDate DATE
)
",
    r"
CREATE TABLE Products (
    ProductID INTEGER PRIMARY KEY,
    Name TEXT NOT NULL,
    Category TEXT,
    Price DECIMAL(10,2),
    Stock INTEGER
)
",
    r"
CREATE TABLE Employees (
    EmployeeID INTEGER PRIMARY KEY,
    Name TEXT NOT NULL,
    Position TEXT,
    Salary DECIMAL(10,2),
    HireDate DATE
)
",
    r"
CREATE TABLE Orders (
    OrderID INTEGER PRIMARY KEY,
    CustomerID INTEGER,
    OrderDate DATE,
    TotalAmount DECIMAL(10,2),
    FOREIGN KEY (CustomerID) REFERENCES Customers(CustomerID)
)
",
    r"
CREATE TABLE OrderDetails (
    OrderDetailID INTEGER PRIMARY KEY,
    OrderID INTEGER,
    ProductID INTEGER,
    Quantity INTEGER,
    UnitPrice DECIMAL(10,2),
    FOREIGN KEY (OrderID) REFERENCES Orders(OrderID),
    FOREIGN KEY (ProductID) REFERENCES Products(ProductID)
)
",
];

/// `(CustomerID, Name, Email, Phone, JoinDate)`
pub const CUSTOMERS: &[(i64, &str, &str, &str, &str)] = &[
    (1, "John Smith", "john@example.com", "555-1234", "2020-01-15"),
    (2, "Jane Doe", "jane@example.com", "555-5678", "2019-06-22"),
    (3, "Bob Johnson", "bob@example.com", "555-9012", "2021-03-10"),
    (4, "Alice Brown", "alice@example.com", "555-3456", "2018-11-05"),
    (5, "Charlie Wilson", "charlie@example.com", "555-7890", "2022-02-28"),
];

/// `(ProductID, Name, Category, Price, Stock)`
pub const PRODUCTS: &[(i64, &str, &str, f64, i64)] = &[
    (1, "Laptop", "Electronics", 999.99, 50),
    (2, "Smartphone", "Electronics", 699.99, 100),
    (3, "Desk Chair", "Furniture", 199.99, 30),
    (4, "Coffee Table", "Furniture", 149.99, 25),
    (5, "Headphones", "Electronics", 89.99, 75),
    (6, "Bookshelf", "Furniture", 129.99, 20),
    (7, "Tablet", "Electronics", 399.99, 60),
    (8, "Monitor", "Electronics", 299.99, 40),
];

/// `(EmployeeID, Name, Position, Salary, HireDate)`
pub const EMPLOYEES: &[(i64, &str, &str, f64, &str)] = &[
    (1, "Michael Scott", "Manager", 75000.00, "2018-05-10"),
    (2, "Jim Halpert", "Sales", 65000.00, "2019-03-15"),
    (3, "Pam Beesly", "Reception", 48000.00, "2019-04-20"),
    (4, "Dwight Schrute", "Sales", 67000.00, "2018-09-30"),
    (5, "Angela Martin", "Accounting", 59000.00, "2018-07-25"),
    (6, "Kevin Malone", "Accounting", 52000.00, "2020-01-15"),
    (7, "Stanley Hudson", "Sales", 63000.00, "2021-11-05"),
    (8, "Phyllis Vance", "Sales", 61000.00, "2022-02-10"),
];

/// `(OrderID, CustomerID, OrderDate, TotalAmount)`
pub const ORDERS: &[(i64, i64, &str, f64)] = &[
    (1, 1, "2023-01-15", 1699.98),
    (2, 2, "2023-02-20", 699.99),
    (3, 3, "2023-03-10", 349.98),
    (4, 4, "2023-04-05", 129.99),
    (5, 5, "2023-05-12", 1299.97),
    (6, 1, "2023-06-18", 199.99),
    (7, 2, "2023-07-22", 89.99),
    (8, 3, "2022-08-30", 399.99),
    (9, 4, "2022-09-15", 299.99),
    (10, 5, "2022-10-20", 129.99),
];

/// `(OrderDetailID, OrderID, ProductID, Quantity, UnitPrice)`
pub const ORDER_DETAILS: &[(i64, i64, i64, i64, f64)] = &[
    (1, 1, 1, 1, 999.99),
    (2, 1, 5, 1, 699.99),
    (3, 2, 2, 1, 699.99),
    (4, 3, 3, 1, 199.99),
    (5, 3, 5, 1, 149.99),
    (6, 4, 6, 1, 129.99),
    (7, 5, 1, 1, 999.99),
    (8, 5, 7, 1, 299.99),
    (9, 6, 3, 1, 199.99),
    (10, 7, 5, 1, 89.99),
    (11, 8, 7, 1, 399.99),
    (12, 9, 8, 1, 299.99),
    (13, 10, 6, 1, 129.99),
];

/// Questions that work well against the sample database.
pub const EXAMPLE_QUESTIONS: &[&str] = &[
    "Top 5 Customers by Total Purchase Amount",
    "Products with No Sales in the Last 6 Months",
    "List Employees Hired in the Last 5 Years",
    "Identify Products with No Sales in the Past Year",
    "Average Order Quantity by Product Category",
    "Employees with Above-Average Salaries",
];

/// Renders [`EXAMPLE_QUESTIONS`] as a numbered list.
#[must_use]
pub fn examples_text() -> String {
    let mut out = String::from("Example Questions:\n\n");
    for (i, question) in EXAMPLE_QUESTIONS.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, question));
    }
    out
}
