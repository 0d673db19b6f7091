//! Onboarding tutorial content for typeflow CLI

/// Get the interactive onboarding tutorial content
pub fn get_onboarding_content() -> &'static str {
    r#"WELCOME TO TYPEFLOW

Typeflow resolves typed pipeline expressions embedded in text.

STEP 1: A PLAIN VALUE
---------------------
An expression names a type and a seed.

  typeflow process '[TEXT(hello)]'
  => hello

STEP 2: OPERATIONS
------------------
After '=>' come the operations, applied left to right.

  typeflow process '[TEXT(hello) => upper append(!)]'
  => HELLO!

STEP 3: EMBEDDING
-----------------
Expressions can sit anywhere in a larger text.

  echo 'Total: [NUMBER(19.99) => multiply(3)]' | typeflow process
  => Total: 59.97

STEP 4: CHANGING TYPE
---------------------
Some operations produce a different type.

  typeflow process '[JSON({"user": {"name": "Ada"}}) => extract(user.name) upper]'
  => ADA

STEP 5: NESTING
---------------
Inner expressions are resolved first.

  typeflow process '[LIST(b,[TEXT(a) => upper],c) => ascending join(-)]'
  => A-b-c

STEP 6: ESCAPING
----------------
Backslash makes ( ) , ] literal.

  typeflow process '[TEXT(a\,b) => append(\,c)]'
  => a,b,c

STEP 7: VARIABLES
-----------------
Seeds can name variables supplied by the host.

  typeflow process --vars vars.json '[LIST(names) => size]'
  => 3          (with vars.json = {"names": ["x", "y", "z"]})

NEXT STEPS
----------
  typeflow docs              List all documentation categories
  typeflow doc chains        Operations and arity
  typeflow functions LIST    Every LIST operation
"#
}
