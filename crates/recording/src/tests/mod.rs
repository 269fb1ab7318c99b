mod artifacts_tests;
