pub const ANSI_RESERVED_KEYWORDS: &str = r#"ALL
ALTER
AND
ANY
AS
ASC
BETWEEN
BY
CALL
CASCADE
CASE
CAST
CHECK
COLLATE
COLUMN
CONSTRAINT
CREATE
CROSS
CURRENT
CURRENT_DATE
CURRENT_TIME
CURRENT_TIMESTAMP
CURRENT_USER
DEFAULT
DELETE
DESC
DISTINCT
DROP
ELSE
END
ESCAPE
EXCEPT
EXEC
EXECUTE
EXISTS
FALSE
FETCH
FOR
FOREIGN
FROM
FULL
GRANT
GROUP
HAVING
IN
INNER
INSERT
INTERSECT
INTO
IS
JOIN
LATERAL
LEFT
LIKE
LIMIT
MERGE
NATURAL
NOT
NULL
OFFSET
ON
OR
ORDER
OUTER
OVER
PARTITION
PRIMARY
REFERENCES
RESTRICT
REVOKE
RIGHT
ROLLUP
SELECT
SET
SOME
TABLE
THEN
TO
TRUE
TRUNCATE
UNION
UNIQUE
UPDATE
USING
VALUES
VIEW
WHEN
WHERE
WINDOW
WITH"#;

pub const ANSI_UNRESERVED_KEYWORDS: &str = r#"ACTION
ADD
BEGIN
CASCADED
CATALOG
COMMENT
COMMIT
CONSTRAINTS
CONTINUE
CURSOR
DATA
DEFERRED
DESCRIBE
EXPLAIN
FIRST
FUNCTION
IF
IMMEDIATE
INDEX
ISOLATION
KEY
LAST
LEVEL
LOCAL
MATERIALIZED
NEXT
NO
NULLS
ONLY
OPTION
PRECEDING
PREPARE
PROCEDURE
READ
RECURSIVE
RELEASE
RENAME
REPEATABLE
REPLACE
RETURNING
ROLLBACK
ROW
ROWS
SAVEPOINT
SCHEMA
SEQUENCE
SESSION
SHOW
START
TEMPORARY
TRANSACTION
TRIGGER
TYPE
UNBOUNDED
WORK
ZONE"#;

pub const ANSI_TYPE_KEYWORDS: &str = r#"BIGINT
BINARY
BIT
BLOB
BOOLEAN
CHAR
CHARACTER
CLOB
DATE
DECIMAL
DOUBLE
FLOAT
INT
INTEGER
INTERVAL
NCHAR
NUMERIC
NVARCHAR
REAL
SMALLINT
TEXT
TIME
TIMESTAMP
VARBINARY
VARCHAR"#;

pub const ANSI_FUNCTIONS: &str = r#"ABS
AVG
CEIL
CHAR_LENGTH
COALESCE
CONCAT
COUNT
FLOOR
GREATEST
LEAST
LENGTH
LOWER
LTRIM
MAX
MIN
MOD
NULLIF
POSITION
POWER
ROUND
RTRIM
SQRT
SUBSTRING
SUM
TRIM
UPPER"#;
